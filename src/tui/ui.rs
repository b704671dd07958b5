//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::Register;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: microcode and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_listing(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);

    // Right side: registers, sequencer and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(15),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(chunks[1]);

    draw_registers(frame, right_chunks[0], app);
    draw_sequencer(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw the control store around the MPC.
fn draw_listing(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let lines = app.get_listing((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = lines
        .iter()
        .map(|(addr, text, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else if text == "--" {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}{:02X}: {}", bp, prefix, addr, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Microcode ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw the data-path registers, highlighting the ones the last step changed.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;

    let content: Vec<Line> = Register::ALL
        .iter()
        .map(|&reg| {
            let value = regs.get(reg);
            let changed = app
                .previous
                .as_ref()
                .map_or(false, |prev| prev.get(reg) != value);
            let style = if changed {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::raw(format!("{:<6}", reg.name())),
                Span::styled(format!("{:02X}", value), style),
                Span::raw(format!("  {:08b}", value)),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(format!(" Registers  PC={:04X} MAR={:04X} ", regs.pc(), regs.mar()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw the microsequencer and status word.
fn draw_sequencer(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let seq = &app.cpu.seq;
    let status = &app.cpu.status;

    let flag = |name: &'static str, on: bool| {
        Span::styled(
            format!("{} ", name),
            if on {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        )
    };

    let content = vec![
        Line::from(vec![
            Span::raw("MPC: "),
            Span::styled(format!("{:02X}", seq.mpc), Style::default().fg(Color::Yellow)),
            Span::raw(format!("   MUX: {:02X}   MRTN: {:02X}", seq.mux, seq.mrtn)),
        ]),
        Line::from(format!(
            "Pipeline  W:{:X} R:{:X} ALU:{:X} J:{:X}",
            seq.pipeline.write, seq.pipeline.read, seq.pipeline.alu, seq.pipeline.jump
        )),
        Line::from(vec![
            Span::raw("Status: "),
            flag("P", status.positive),
            flag("Z", status.zero),
            flag("N", status.negative),
            flag("C", status.carry),
            flag("/CDAV", status.data_not_available),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Sequencer ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("d: Toggle /CDAV  x: Reset  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
