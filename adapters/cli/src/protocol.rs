//! Line-oriented reader for the referee's turn protocol.

use std::io::BufRead;

use sonar_scout_core::{
    Color, CreatureId, CreatureKind, DroneId, DroneReport, DroneScan, Point, Quadrant,
    RadarReport, RosterEntry, TurnObservation, Vector, VisibleCreature, COLORS,
};
use thiserror::Error;

/// Reasons the referee input could not be decoded.
#[derive(Debug, Error)]
pub(crate) enum ProtocolError {
    /// Reading from the input stream failed.
    #[error("failed to read referee input")]
    Io(#[from] std::io::Error),
    /// The stream ended in the middle of a block.
    #[error("input ended while reading {0}")]
    UnexpectedEof(&'static str),
    /// A line carried fewer fields than its record needs.
    #[error("line {line} is missing the {field} field")]
    MissingField {
        /// One-based line number.
        line: usize,
        /// Name of the absent field.
        field: &'static str,
    },
    /// A field could not be parsed as an integer.
    #[error("line {line}: {field} `{value}` is not an integer")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// Name of the malformed field.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },
    /// A roster line used an unknown creature type.
    #[error("line {line}: unknown creature type {value}")]
    UnknownKind {
        /// One-based line number.
        line: usize,
        /// Raw type value.
        value: i32,
    },
    /// A roster line used a color outside the known categories.
    #[error("line {line}: unknown fish color {value}")]
    UnknownColor {
        /// One-based line number.
        line: usize,
        /// Raw color value.
        value: i32,
    },
    /// A radar line used an unknown quadrant label.
    #[error("line {line}: unknown radar quadrant `{label}`")]
    UnknownQuadrant {
        /// One-based line number.
        line: usize,
        /// Raw label.
        label: String,
    },
}

/// Reader that turns referee lines into roster entries and turn observations.
#[derive(Debug)]
pub(crate) struct ProtocolReader<R> {
    input: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> ProtocolReader<R> {
    /// Wraps the provided input stream.
    pub(crate) fn new(input: R) -> Self {
        Self {
            input,
            buffer: String::new(),
            line: 0,
        }
    }

    /// Reads the roster announced before the first turn.
    pub(crate) fn read_roster(&mut self) -> Result<Vec<RosterEntry>, ProtocolError> {
        let count = self.read_count("roster size")?;
        let mut roster = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields("roster entry")?;
            let creature = fields.id("creature id")?;
            let color = fields.int("color")?;
            let kind_value = fields.int("type")?;
            let line = fields.line;

            let kind = CreatureKind::from_protocol(kind_value).ok_or(
                ProtocolError::UnknownKind {
                    line,
                    value: kind_value,
                },
            )?;
            let color = match kind {
                CreatureKind::Monster => Color::new(u8::MAX),
                CreatureKind::Fish(_) => u8::try_from(color)
                    .ok()
                    .filter(|value| *value < COLORS)
                    .map(Color::new)
                    .ok_or(ProtocolError::UnknownColor { line, value: color })?,
            };

            roster.push(RosterEntry {
                creature: CreatureId::new(creature),
                color,
                kind,
            });
        }
        Ok(roster)
    }

    /// Reads one turn block, returning `None` when the referee closed the
    /// stream between turns.
    pub(crate) fn read_turn(&mut self) -> Result<Option<TurnObservation>, ProtocolError> {
        let Some(own_score) = self.try_read_count("own score")? else {
            return Ok(None);
        };
        let own_score = own_score as u32;
        let foe_score = self.read_count("foe score")? as u32;

        let own_registered = self.read_ids("own registrations")?;
        let foe_registered = self.read_ids("foe registrations")?;
        let own_drones = self.read_drones("own drones")?;
        let foe_drones = self.read_drones("foe drones")?;

        let count = self.read_count("drone scan count")?;
        let mut drone_scans = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields("drone scan")?;
            drone_scans.push(DroneScan {
                drone: DroneId::new(fields.id("drone id")?),
                creature: CreatureId::new(fields.id("creature id")?),
            });
        }

        let count = self.read_count("visible creature count")?;
        let mut visible = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields("visible creature")?;
            let creature = CreatureId::new(fields.id("creature id")?);
            let position = Point::new(fields.int("x")?, fields.int("y")?);
            let velocity = Vector::new(fields.int("vx")?, fields.int("vy")?);
            visible.push(VisibleCreature {
                creature,
                position,
                velocity,
            });
        }

        let count = self.read_count("radar blip count")?;
        let mut radar = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields("radar blip")?;
            let drone = DroneId::new(fields.id("drone id")?);
            let creature = CreatureId::new(fields.id("creature id")?);
            let line = fields.line;
            let label = fields.text("quadrant")?;
            let quadrant =
                Quadrant::from_label(label).ok_or_else(|| ProtocolError::UnknownQuadrant {
                    line,
                    label: label.to_owned(),
                })?;
            radar.push(RadarReport {
                drone,
                creature,
                quadrant,
            });
        }

        Ok(Some(TurnObservation {
            own_score,
            foe_score,
            own_registered,
            foe_registered,
            own_drones,
            foe_drones,
            drone_scans,
            visible,
            radar,
        }))
    }

    fn read_ids(&mut self, what: &'static str) -> Result<Vec<CreatureId>, ProtocolError> {
        let count = self.read_count(what)?;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields(what)?;
            ids.push(CreatureId::new(fields.id("creature id")?));
        }
        Ok(ids)
    }

    fn read_drones(&mut self, what: &'static str) -> Result<Vec<DroneReport>, ProtocolError> {
        let count = self.read_count(what)?;
        let mut drones = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = self.next_fields(what)?;
            let drone = DroneId::new(fields.id("drone id")?);
            let position = Point::new(fields.int("x")?, fields.int("y")?);
            let emergency = fields.int("emergency")? != 0;
            let battery = fields.int("battery")?;
            drones.push(DroneReport {
                drone,
                position,
                emergency,
                battery,
            });
        }
        Ok(drones)
    }

    fn read_count(&mut self, what: &'static str) -> Result<usize, ProtocolError> {
        self.try_read_count(what)?
            .ok_or(ProtocolError::UnexpectedEof(what))
    }

    fn try_read_count(&mut self, what: &'static str) -> Result<Option<usize>, ProtocolError> {
        if !self.advance()? {
            return Ok(None);
        }
        let mut fields = Fields::new(&self.buffer, self.line);
        let value = fields.int(what)?;
        usize::try_from(value)
            .map(Some)
            .map_err(|_| ProtocolError::InvalidNumber {
                line: self.line,
                field: what,
                value: value.to_string(),
            })
    }

    fn next_fields(&mut self, what: &'static str) -> Result<Fields<'_>, ProtocolError> {
        if !self.advance()? {
            return Err(ProtocolError::UnexpectedEof(what));
        }
        Ok(Fields::new(&self.buffer, self.line))
    }

    fn advance(&mut self) -> Result<bool, ProtocolError> {
        loop {
            self.buffer.clear();
            if self.input.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line += 1;
            if !self.buffer.trim().is_empty() {
                return Ok(true);
            }
        }
    }
}

struct Fields<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            tokens: text.split_whitespace(),
            line,
        }
    }

    fn text(&mut self, field: &'static str) -> Result<&'a str, ProtocolError> {
        self.tokens.next().ok_or(ProtocolError::MissingField {
            line: self.line,
            field,
        })
    }

    fn int(&mut self, field: &'static str) -> Result<i32, ProtocolError> {
        let raw = self.text(field)?;
        raw.parse().map_err(|_| ProtocolError::InvalidNumber {
            line: self.line,
            field,
            value: raw.to_owned(),
        })
    }

    fn id(&mut self, field: &'static str) -> Result<u32, ProtocolError> {
        let raw = self.text(field)?;
        raw.parse().map_err(|_| ProtocolError::InvalidNumber {
            line: self.line,
            field,
            value: raw.to_owned(),
        })
    }
}
