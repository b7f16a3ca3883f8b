//! Formats drone orders as referee command lines.

use std::io::{self, Write};

use sonar_scout_core::{Action, DroneOrder};

/// Renders a single order, e.g. `MOVE 2000 4350 1 4 7` or `WAIT 0`.
///
/// Target ids follow the light flag as a free-form annotation.
pub(crate) fn format_order(order: &DroneOrder) -> String {
    let light = u8::from(order.light);
    let mut line = match order.action {
        Action::MoveTo(point) => format!("MOVE {} {} {light}", point.x(), point.y()),
        Action::Hold => format!("WAIT {light}"),
    };
    for target in &order.targets {
        line.push(' ');
        line.push_str(&target.get().to_string());
    }
    line
}

/// Writes one line per order and flushes so the referee sees the turn.
pub(crate) fn write_orders<W: Write>(out: &mut W, orders: &[DroneOrder]) -> io::Result<()> {
    for order in orders {
        writeln!(out, "{}", format_order(order))?;
    }
    out.flush()
}
