use anyhow::Result;
use crossterm::event::{self, KeyCode, KeyEventKind};
use log::{info, warn};
use pacer::db::DocumentStore;
use pacer::session::{Session, SessionSummary, WorkoutView};
use pacer::timer::{CueKind, CuePlayer, HoldGate, Phase, format_clock};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};
use std::io::Write;
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(100);

/// Rings the terminal bell; the closest a terminal gets to audio.
pub struct BellCues;

impl CuePlayer for BellCues {
    fn play(&self, cue: CueKind) -> Result<()> {
        let bells = match cue {
            CueKind::Done => "\x07\x07",
            _ => "\x07",
        };
        let mut out = std::io::stdout();
        out.write_all(bells.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

struct Gates {
    skip: HoldGate,
    exit: HoldGate,
}

impl Gates {
    fn new(hold: bool) -> Self {
        if hold {
            Self {
                skip: HoldGate::skip(),
                exit: HoldGate::exit(),
            }
        } else {
            Self {
                skip: HoldGate::tap(),
                exit: HoldGate::tap(),
            }
        }
    }
}

enum Screen {
    Running,
    Summary {
        summary: SessionSummary,
        message: Option<String>,
        saved: bool,
    },
}

pub enum PlayerExit {
    Saved,
    Discarded,
    Quit,
}

/// Interactive player for one workout. The session's driver ticks the timer
/// in the background; this loop only draws and forwards keys.
pub async fn run_player(
    mut terminal: DefaultTerminal,
    session: &Session<DocumentStore>,
    plan_key: &str,
    hold: bool,
) -> Result<PlayerExit> {
    session.start_workout(plan_key).await?;
    session.resume().await?;

    let mut gates = Gates::new(hold);
    let mut screen = Screen::Running;
    let mut status = String::new();

    loop {
        if matches!(screen, Screen::Running) && session.is_complete().await {
            let summary = session.complete_workout().await?;
            screen = Screen::Summary {
                summary,
                message: None,
                saved: false,
            };
        }

        match &screen {
            Screen::Running => {
                let view = session.snapshot().await?;
                let now = Instant::now();
                let holds = (gates.skip.progress(now), gates.exit.progress(now));
                terminal.draw(|frame| draw_running(frame, &view, &status, holds, hold))?;
            }
            Screen::Summary {
                summary,
                message,
                saved,
            } => {
                terminal.draw(|frame| draw_summary(frame, summary, message.as_deref(), *saved))?;
            }
        }

        if !event::poll(POLL)? {
            continue;
        }
        let event::Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        match &mut screen {
            Screen::Running => match key.code {
                KeyCode::Char(' ') | KeyCode::Char('p') => match session.toggle().await {
                    Ok(true) => status = "Running".to_string(),
                    Ok(false) => status = "Paused".to_string(),
                    Err(e) => status = e.to_string(),
                },
                KeyCode::Char('s') | KeyCode::Right => {
                    if gates.skip.observe(Instant::now()) {
                        match session.skip().await {
                            Ok(t) => status = format!("Skipped ({:?})", t),
                            Err(e) => status = e.to_string(),
                        }
                    }
                }
                KeyCode::Char('r') => {
                    session.reset().await?;
                    gates.skip.cancel();
                    status = "Reset, press space to start".to_string();
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    if gates.exit.observe(Instant::now()) {
                        session.exit_workout().await;
                        info!("Workout {} abandoned", plan_key);
                        return Ok(PlayerExit::Quit);
                    }
                }
                _ => {}
            },
            Screen::Summary {
                message, saved, ..
            } => match key.code {
                KeyCode::Enter | KeyCode::Char('y') if !*saved => {
                    match session.save_summary().await {
                        Ok(outcome) => {
                            *saved = true;
                            let mut text = format!("Saved. Streak: {} days.", outcome.streak);
                            for a in &outcome.unlocked {
                                text.push_str(&format!("\nUnlocked {} {}", a.emoji, a.title));
                            }
                            *message = Some(text);
                        }
                        Err(e) => {
                            warn!("Save failed: {}", e);
                            *message = Some(format!("Save failed: {}. Press y to retry.", e));
                        }
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc if !*saved => {
                    session.discard_summary().await;
                    return Ok(PlayerExit::Discarded);
                }
                KeyCode::Enter | KeyCode::Char('q') | KeyCode::Esc if *saved => {
                    return Ok(PlayerExit::Saved);
                }
                _ => {}
            },
        }
    }
}

fn phase_color(view: &WorkoutView) -> Color {
    match (view.is_warmup, view.phase) {
        (_, Phase::Rest) => Color::Green,
        (true, Phase::Work) => Color::Yellow,
        (false, Phase::Work) => Color::Red,
    }
}

fn draw_running(frame: &mut Frame, view: &WorkoutView, status: &str, holds: (f64, f64), hold: bool) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(3),
    ])
    .split(frame.area());

    // Header
    let header = Paragraph::new(format!(
        "{}  -  step {}/{}{}",
        view.plan_label,
        (view.step_index + 1).min(view.step_count),
        view.step_count,
        if view.is_warmup { "  (warm-up)" } else { "" }
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    // Clock
    let phase = match view.phase {
        Phase::Work => "WORK",
        Phase::Rest => "REST",
    };
    let exercise = view.exercise.as_deref().unwrap_or("Done");
    let clock = Paragraph::new(format!(
        "{}\n{}  {}{}",
        exercise,
        phase,
        format_clock(view.seconds_remaining),
        if view.is_running { "" } else { "  (paused)" }
    ))
    .style(
        Style::default()
            .fg(phase_color(view))
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL).title("Now"));
    frame.render_widget(clock, chunks[1]);

    // Phase progress
    let ratio = if view.phase_total == 0 {
        1.0
    } else {
        1.0 - view.seconds_remaining as f64 / view.phase_total as f64
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Workout {}%", view.progress_pct)),
        )
        .gauge_style(Style::default().fg(phase_color(view)))
        .ratio(ratio.clamp(0.0, 1.0));
    frame.render_widget(gauge, chunks[2]);

    draw_details(frame, view, chunks[3]);

    // Footer
    let keys = if hold {
        "space: pause/resume | hold s: skip | r: reset | hold q: exit"
    } else {
        "space: pause/resume | s: skip | r: reset | q: exit"
    };
    let mut footer_text = format!("{}  {}", keys, status);
    if holds.0 > 0.0 {
        footer_text = format!("Skipping... {:.0}%", holds.0 * 100.0);
    } else if holds.1 > 0.0 {
        footer_text = format!("Exiting... {:.0}%", holds.1 * 100.0);
    }
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(footer, chunks[4]);
}

fn draw_details(frame: &mut Frame, view: &WorkoutView, area: Rect) {
    let halves = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let steps: Vec<ListItem> = view
        .instructions
        .iter()
        .map(|s| ListItem::new(format!("- {}", s)))
        .collect();
    let how = List::new(steps).block(Block::default().borders(Borders::ALL).title("How to"));
    frame.render_widget(how, halves[0]);

    let next: Vec<ListItem> = view
        .up_next
        .iter()
        .map(|n| ListItem::new(n.as_str()))
        .collect();
    let up_next = List::new(next).block(Block::default().borders(Borders::ALL).title("Up next"));
    frame.render_widget(up_next, halves[1]);
}

fn draw_summary(frame: &mut Frame, summary: &SessionSummary, message: Option<&str>, saved: bool) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(3),
    ])
    .split(frame.area());

    let header = Paragraph::new("Workout complete!")
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let mut body = format!(
        "{}\n{} min  ({} steps)",
        summary.plan_label, summary.minutes, summary.steps
    );
    if let Some(m) = message {
        body.push_str("\n\n");
        body.push_str(m);
    }
    let details = Paragraph::new(body).block(Block::default().borders(Borders::ALL).title("Summary"));
    frame.render_widget(details, chunks[1]);

    let keys = if saved {
        "enter: done"
    } else {
        "y: save to history | n: discard"
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(footer, chunks[2]);
}
