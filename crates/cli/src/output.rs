//! Console rendering of engine events.

use bt_protocol::ipc::Event;
use bt_protocol::routing_models::Routing;
use bt_protocol::step_models::{StepSnapshot, StepStatus};
use colored::{ColoredString, Colorize};
use tokio::sync::mpsc::Receiver;

/// Print events until the engine drops its sender.
pub async fn print_events(mut events: Receiver<Event>, json: bool) {
    while let Some(event) = events.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
            }
        } else if let Some(text) = format_event(&event) {
            println!("{text}");
        }
    }
}

/// Human-readable form of an event, or `None` for events only logged.
pub fn format_event(event: &Event) -> Option<String> {
    match event {
        Event::StatusSnapshot { frame, steps, .. } => {
            let mut lines = vec![format!("Frame {frame}").bold().to_string()];
            lines.extend(steps.iter().map(|step| format!("  {}", format_snapshot(step))));
            Some(lines.join("\n"))
        }
        Event::StepCompleted {
            step, skipped: true, ..
        } => Some(format!("{} {step}", "skipped".dimmed())),
        Event::EventRejected { step, reason, .. } => {
            Some(format!("{} {step}: {reason}", "rejected".yellow()))
        }
        Event::TransportUnavailable { error, .. } => {
            Some(format!("{} {error}", "transport".red()))
        }
        _ => None,
    }
}

/// One status line, colored by state.
pub fn format_snapshot(step: &StepSnapshot) -> String {
    state_color(step.state, &step.to_string()).to_string()
}

pub fn format_routing(routing: &Routing) -> String {
    let mut line = format!("{} ({} steps)", routing.name.bold(), routing.steps.len());
    if !routing.description.is_empty() {
        line.push_str(&format!(": {}", routing.description));
    }
    line
}

fn state_color(state: StepStatus, text: &str) -> ColoredString {
    match state {
        StepStatus::Pending => text.dimmed(),
        StepStatus::Running => text.green(),
        StepStatus::Idle => text.yellow(),
        StepStatus::Complete => text.blue(),
    }
}
