//! Placement validation in level-block coordinates.

use last_bus_core::{
    metrics::{
        capacity, LEVEL_SIZE_UNIT_BLOCKS, RESPAWN_MAX_DISTANCE_BLOCKS, RIGHT_MARGIN_BLOCKS,
        SCREEN_BLOCKS, TRIGGER_MIN_SPACING_BLOCKS,
    },
    CarColor, GameData, MusicId, ObjectKind, SkyColor, TriggerPayload,
};

use crate::{
    error::{InvalidLevel, InvalidReason},
    parse::{Keyword, Statement},
};

/// Object placed at a single position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Placement {
    Coin {
        kind: ObjectKind,
        x: u32,
        height: u32,
    },
    Peel {
        x: u32,
    },
    Crack {
        x: u32,
        pattern: usize,
    },
    Rope {
        x: u32,
    },
    Spring {
        x: u32,
    },
    Obstacle {
        kind: ObjectKind,
        x: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CratePlan {
    pub(crate) x: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HolePlan {
    pub(crate) x: u32,
    pub(crate) width: u32,
    pub(crate) passageway: bool,
}

impl HolePlan {
    fn right(&self) -> u32 {
        self.x + self.width
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TriggerPlan {
    pub(crate) x: u32,
    pub(crate) payload: TriggerPayload,
}

/// Validated content of a level description, still in level-blocks.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Blueprint {
    pub(crate) size: u32,
    pub(crate) sky: SkyColor,
    pub(crate) music: MusicId,
    pub(crate) placements: Vec<Placement>,
    pub(crate) crates: Vec<CratePlan>,
    pub(crate) holes: Vec<HolePlan>,
    pub(crate) respawns: Vec<u32>,
    pub(crate) triggers: Vec<TriggerPlan>,
}

impl Blueprint {
    /// Level width in level-blocks.
    pub(crate) fn level_blocks(&self) -> u32 {
        self.size * LEVEL_SIZE_UNIT_BLOCKS
    }

    pub(crate) fn from_statements(
        statements: &[Statement],
        data: &GameData,
    ) -> Result<Self, InvalidLevel> {
        let split = statements
            .iter()
            .position(|statement| !statement.keyword.is_directive())
            .unwrap_or(statements.len());
        let (directives, objects) = statements.split_at(split);

        let mut set = DirectiveSet::default();
        for statement in directives {
            set.apply(statement)?;
        }
        let first_object_line = objects.first().map_or(0, |statement| statement.line);
        let (size, sky, music) = set.finish(first_object_line)?;

        let mut blueprint = Self {
            size,
            sky,
            music,
            placements: Vec::new(),
            crates: Vec::new(),
            holes: Vec::new(),
            respawns: Vec::new(),
            triggers: Vec::new(),
        };
        let mut cursor = SCREEN_BLOCKS;
        for statement in objects {
            cursor += statement.values[0];
            blueprint.place(statement, cursor, data)?;
        }
        blueprint.check_respawns()?;
        Ok(blueprint)
    }

    fn place(&mut self, statement: &Statement, x: u32, data: &GameData) -> Result<(), InvalidLevel> {
        let footprint = match statement.keyword {
            Keyword::LevelSize | Keyword::SkyColor | Keyword::Bgm => {
                return Err(statement.invalid(InvalidReason::DuplicateDirective(
                    statement.keyword.name(),
                )));
            }
            Keyword::Crates => statement.values[1],
            Keyword::Hole | Keyword::Passageway => statement.values[1],
            Keyword::Hydrant
            | Keyword::Sign
            | Keyword::Car
            | Keyword::Van
            | Keyword::Truck
            | Keyword::Scooter => obstacle_kind(statement.keyword)
                .and_then(|kind| data.obstacle(kind))
                .map_or(1, |template| template.width_blocks),
            _ => 1,
        };
        self.check_extent(statement, x, footprint)?;

        match statement.keyword {
            Keyword::SilverCoin | Keyword::GoldCoin => {
                let kind = if statement.keyword == Keyword::SilverCoin {
                    ObjectKind::SilverCoin
                } else {
                    ObjectKind::GoldCoin
                };
                let height = in_range(statement, "coin height", statement.value_or(1, 0), 0, 3)?;
                self.placements.push(Placement::Coin { kind, x, height });
            }
            Keyword::Crates => {
                let width = in_range(statement, "crate width", statement.values[1], 1, 8)?;
                let height = in_range(statement, "crate height", statement.values[2], 1, 8)?;
                for existing in &self.crates {
                    if existing.x == x {
                        return Err(statement.invalid(InvalidReason::Duplicate("crate block", x)));
                    }
                    if spans_overlap(x, width, existing.x, existing.width) {
                        return Err(statement
                            .invalid(InvalidReason::Overlap("crate block", "crate block")));
                    }
                }
                if self
                    .holes
                    .iter()
                    .any(|hole| spans_overlap(x, width, hole.x, hole.width))
                {
                    return Err(statement.invalid(InvalidReason::Overlap("crate block", "hole")));
                }
                self.crates.push(CratePlan { x, width, height });
            }
            Keyword::Hole | Keyword::Passageway => {
                let passageway = statement.keyword == Keyword::Passageway;
                let (field, max) = if passageway {
                    ("passageway width", 32)
                } else {
                    ("hole width", 16)
                };
                let width = in_range(statement, field, statement.values[1], 2, max)?;
                if passageway
                    && self.holes.iter().filter(|hole| hole.passageway).count()
                        >= capacity::PASSAGEWAYS
                {
                    return Err(
                        statement.invalid(InvalidReason::TooManyPassageways(capacity::PASSAGEWAYS))
                    );
                }
                if self
                    .holes
                    .iter()
                    .any(|hole| spans_overlap(x, width, hole.x, hole.width))
                {
                    return Err(statement.invalid(InvalidReason::Overlap("hole", "hole")));
                }
                if self
                    .crates
                    .iter()
                    .any(|block| spans_overlap(x, width, block.x, block.width))
                {
                    return Err(statement.invalid(InvalidReason::Overlap("hole", "crate block")));
                }
                self.holes.push(HolePlan {
                    x,
                    width,
                    passageway,
                });
            }
            Keyword::Respawn => {
                if self.respawns.contains(&x) {
                    return Err(statement.invalid(InvalidReason::Duplicate("respawn point", x)));
                }
                self.respawns.push(x);
            }
            Keyword::Peel => self.placements.push(Placement::Peel { x }),
            Keyword::Geyser => {
                let count = data.geyser_pattern_count() as u32;
                let pattern = in_range(statement, "geyser pattern", statement.value_or(1, 1), 1, count)?;
                self.placements.push(Placement::Crack {
                    x,
                    pattern: (pattern - 1) as usize,
                });
            }
            Keyword::Rope => self.placements.push(Placement::Rope { x }),
            Keyword::Spring => self.placements.push(Placement::Spring { x }),
            Keyword::Hydrant
            | Keyword::Sign
            | Keyword::Car
            | Keyword::Van
            | Keyword::Truck
            | Keyword::Scooter => {
                if let Some(kind) = obstacle_kind(statement.keyword) {
                    self.placements.push(Placement::Obstacle { kind, x });
                }
            }
            Keyword::CarTrigger => {
                let code = in_range(statement, "car colour", statement.values[1], 1, 3)?;
                let payload = CarColor::from_code(code).map_or(TriggerPayload::Hen, TriggerPayload::Car);
                self.trigger(statement, x, payload)?;
            }
            Keyword::HenTrigger => self.trigger(statement, x, TriggerPayload::Hen)?,
            Keyword::LevelSize | Keyword::SkyColor | Keyword::Bgm => {}
        }
        Ok(())
    }

    fn trigger(
        &mut self,
        statement: &Statement,
        x: u32,
        payload: TriggerPayload,
    ) -> Result<(), InvalidLevel> {
        for existing in &self.triggers {
            if existing.x == x {
                return Err(statement.invalid(InvalidReason::Duplicate("trigger", x)));
            }
            if existing.x.abs_diff(x) < TRIGGER_MIN_SPACING_BLOCKS {
                return Err(statement.invalid(InvalidReason::TriggerSpacing {
                    x,
                    min: TRIGGER_MIN_SPACING_BLOCKS,
                }));
            }
        }
        self.triggers.push(TriggerPlan { x, payload });
        Ok(())
    }

    fn check_extent(&self, statement: &Statement, x: u32, width: u32) -> Result<(), InvalidLevel> {
        let limit = self.level_blocks() - RIGHT_MARGIN_BLOCKS;
        let right = x + width;
        if right > limit {
            return Err(statement.invalid(InvalidReason::PastRightBoundary { right, limit }));
        }
        Ok(())
    }

    /// Pairs sorted respawn points with sorted deep holes.
    fn check_respawns(&self) -> Result<(), InvalidLevel> {
        let mut holes: Vec<HolePlan> = self
            .holes
            .iter()
            .copied()
            .filter(|hole| !hole.passageway)
            .collect();
        holes.sort_by_key(|hole| hole.x);
        let mut respawns = self.respawns.clone();
        respawns.sort_unstable();

        if holes.len() != respawns.len() {
            return Err(InvalidLevel::whole(InvalidReason::RespawnCount {
                respawns: respawns.len(),
                holes: holes.len(),
            }));
        }

        let mut previous_right: Option<u32> = None;
        for (hole, respawn) in holes.iter().zip(respawns) {
            let too_far = respawn + RESPAWN_MAX_DISTANCE_BLOCKS < hole.x;
            let behind_previous = previous_right.is_some_and(|right| respawn <= right);
            if respawn >= hole.x || too_far || behind_previous {
                return Err(InvalidLevel::whole(InvalidReason::RespawnPlacement {
                    respawn,
                    hole: hole.x,
                }));
            }
            previous_right = Some(hole.right());
        }
        Ok(())
    }
}

#[derive(Default)]
struct DirectiveSet {
    size: Option<u32>,
    sky: Option<SkyColor>,
    music: Option<MusicId>,
}

impl DirectiveSet {
    fn apply(&mut self, statement: &Statement) -> Result<(), InvalidLevel> {
        let value = statement.values[0];
        let duplicate = match statement.keyword {
            Keyword::LevelSize => {
                let size = in_range(statement, "level-size", value, 8, 32)?;
                self.size.replace(size).is_some()
            }
            Keyword::SkyColor => {
                let code = in_range(statement, "sky-color", value, 1, 3)?;
                self.sky.replace(sky_color(code)).is_some()
            }
            Keyword::Bgm => {
                let code = in_range(statement, "bgm", value, 1, 3)?;
                self.music.replace(music(code)).is_some()
            }
            _ => false,
        };
        if duplicate {
            return Err(statement.invalid(InvalidReason::DuplicateDirective(
                statement.keyword.name(),
            )));
        }
        Ok(())
    }

    fn finish(self, line: usize) -> Result<(u32, SkyColor, MusicId), InvalidLevel> {
        let missing = |name| InvalidLevel::new(line, InvalidReason::MissingDirective(name));
        let size = self.size.ok_or_else(|| missing("level-size"))?;
        let sky = self.sky.ok_or_else(|| missing("sky-color"))?;
        let music = self.music.ok_or_else(|| missing("bgm"))?;
        Ok((size, sky, music))
    }
}

fn sky_color(code: u32) -> SkyColor {
    SkyColor::from_code(code).unwrap_or(SkyColor::Morning)
}

fn music(code: u32) -> MusicId {
    MusicId::from_bgm_code(code).unwrap_or(MusicId::Street)
}

fn obstacle_kind(keyword: Keyword) -> Option<ObjectKind> {
    match keyword {
        Keyword::Hydrant => Some(ObjectKind::Hydrant),
        Keyword::Sign => Some(ObjectKind::Sign),
        Keyword::Car => Some(ObjectKind::ParkedCar),
        Keyword::Van => Some(ObjectKind::ParkedVan),
        Keyword::Truck => Some(ObjectKind::Truck),
        Keyword::Scooter => Some(ObjectKind::Scooter),
        _ => None,
    }
}

fn in_range(
    statement: &Statement,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<u32, InvalidLevel> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(statement.invalid(InvalidReason::OutOfRange {
            field,
            value,
            min,
            max,
        }))
    }
}

fn spans_overlap(a: u32, a_width: u32, b: u32, b_width: u32) -> bool {
    a < b + b_width && b < a + a_width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::statements;

    fn blueprint(text: &str) -> Result<Blueprint, InvalidLevel> {
        let parsed = statements(text).expect("tokenizes");
        Blueprint::from_statements(&parsed, GameData::standard())
    }

    const HEADER: &str = "level-size 8\nsky-color 1\nbgm 2\n";

    #[test]
    fn cursor_accumulates_relative_offsets() {
        let level = blueprint(&format!("{HEADER}peel 2\npeel 3\nspring 0\n")).expect("valid");
        assert_eq!(
            level.placements,
            vec![
                Placement::Peel { x: 12 },
                Placement::Peel { x: 15 },
                Placement::Spring { x: 15 },
            ]
        );
    }

    #[test]
    fn directive_after_objects_is_a_duplicate() {
        let error = blueprint(&format!("{HEADER}peel 2\nbgm 1\n")).expect_err("rejected");
        assert_eq!(error.line, 5);
        assert_eq!(error.reason, InvalidReason::DuplicateDirective("bgm"));
    }

    #[test]
    fn object_before_all_directives_names_the_missing_one() {
        let error = blueprint("level-size 8\nbgm 1\npeel 2\n").expect_err("rejected");
        assert_eq!(error.line, 3);
        assert_eq!(error.reason, InvalidReason::MissingDirective("sky-color"));
    }

    #[test]
    fn objects_stay_out_of_the_bus_screen() {
        // 80 blocks wide, the last 10 are reserved.
        assert!(blueprint(&format!("{HEADER}crates 58 2 1\n")).is_ok());
        assert!(blueprint(&format!("{HEADER}crates 59 2 1\n")).is_err());
        assert!(blueprint(&format!("{HEADER}peel 59\n")).is_ok());
        let error = blueprint(&format!("{HEADER}peel 60\n")).expect_err("rejected");
        assert_eq!(
            error.reason,
            InvalidReason::PastRightBoundary {
                right: 71,
                limit: 70
            }
        );
    }

    #[test]
    fn holes_reject_crates_and_other_holes() {
        let error =
            blueprint(&format!("{HEADER}crates 5 3 1\npassageway 1 4\n")).expect_err("rejected");
        assert_eq!(error.reason, InvalidReason::Overlap("hole", "crate block"));

        let error =
            blueprint(&format!("{HEADER}passageway 5 4\npassageway 3 4\n")).expect_err("rejected");
        assert_eq!(error.reason, InvalidReason::Overlap("hole", "hole"));
    }

    #[test]
    fn triggers_keep_their_distance() {
        let error = blueprint(&format!("{HEADER}hen-trigger 5\ncar-trigger 9 2\n"))
            .expect_err("rejected");
        assert_eq!(
            error.reason,
            InvalidReason::TriggerSpacing { x: 24, min: 10 }
        );
        let error = blueprint(&format!("{HEADER}hen-trigger 5\nhen-trigger 0\n"))
            .expect_err("rejected");
        assert_eq!(error.reason, InvalidReason::Duplicate("trigger", 15));
        assert!(blueprint(&format!("{HEADER}hen-trigger 5\ncar-trigger 10 2\n")).is_ok());
    }

    #[test]
    fn respawn_points_follow_their_holes() {
        let valid = format!("{HEADER}respawn 6\nhole 2 3\nrespawn 6\nhole 1 2\n");
        assert!(blueprint(&valid).is_ok());

        let too_far = format!("{HEADER}respawn 2\nhole 6 3\n");
        assert!(matches!(
            blueprint(&too_far).expect_err("rejected").reason,
            InvalidReason::RespawnPlacement { respawn: 12, hole: 18 }
        ));

        let missing = format!("{HEADER}respawn 2\nhole 2 3\nhole 6 2\n");
        assert_eq!(
            blueprint(&missing).expect_err("rejected").reason,
            InvalidReason::RespawnCount {
                respawns: 1,
                holes: 2
            }
        );
    }

    #[test]
    fn passageways_are_capped() {
        let mut text = HEADER.to_owned();
        for _ in 0..=capacity::PASSAGEWAYS {
            text.push_str("passageway 3 2\n");
        }
        let error = blueprint(&text).expect_err("rejected");
        assert_eq!(error.line, 8);
        assert_eq!(error.reason, InvalidReason::TooManyPassageways(4));
    }
}
