// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! User interface rendering logic.
//!
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework. It is responsible for layout
//! management, widget styling, and terminal frame composition.
//!
//! # Rendering Pipeline
//!
//! The primary entry point is the [`draw`] function, which is called on every
//! clock tick or state change. Everything drawn comes from a single
//! [`PlaybackSnapshot`] taken at the start of the frame.

mod icons;
mod player;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::{
    App,
    model::{PlaylistItem, SourceKind},
    playback::PlaybackSnapshot,
    render::{
        icons::{ICON_SLIDES, ICON_VIDEO},
        player::draw_player,
    },
    theme::Theme,
};

const HELP: &str = " space play/pause  p play  s pause  n next  b previous  l loop  q quit";

/// Renders the user interface to the terminal frame.
///
/// The screen is split into the playlist sidebar, the stage showing the
/// current item, the player bar and a footer with either the last status
/// message or the key help.
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let snapshot = app.orchestrator.snapshot();

    // Outer layout: main, player, footer
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6), Constraint::Length(1)])
        .split(area);

    // Main layout: sidebar, stage
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(outer[0]);

    draw_sidebar(f, main[0], app.orchestrator.playlist().items(), &snapshot, &app.theme);
    draw_stage(f, main[1], app, &snapshot);

    draw_player(f, outer[1], app, &snapshot);

    draw_footer(f, outer[2], app);
}

fn draw_sidebar(
    f: &mut Frame,
    area: Rect,
    items: &[PlaylistItem],
    snapshot: &PlaybackSnapshot,
    theme: &Theme,
) {
    let block = Block::default()
        .title(" Playlist ")
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(theme.border_colour));

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let icon = match item.source_kind {
                SourceKind::Push => ICON_VIDEO,
                SourceKind::Timed => ICON_SLIDES,
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", icon)),
                Span::raw(item.title.clone()),
            ]))
        })
        .collect();

    let list = List::new(rows)
        .block(block)
        .fg(theme.item_fg)
        .highlight_style(
            Style::default()
                .fg(theme.accent_colour)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(snapshot.current_index);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_stage(f: &mut Frame, area: Rect, app: &App, snapshot: &PlaybackSnapshot) {
    let block = Block::default().padding(Padding::uniform(1));

    let Some(item) = &snapshot.current_item else {
        let message = Paragraph::new("Nothing to play, add items with `showreel add`")
            .alignment(Alignment::Center)
            .fg(app.theme.muted_fg)
            .block(block);
        f.render_widget(message, area);
        return;
    };

    let (heading, detail) = match item.source_kind {
        SourceKind::Push => ("Video", "Playing on the video surface"),
        SourceKind::Timed => ("Slides", "Presenting until the countdown runs out"),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default()
                .fg(app.theme.accent_colour)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::raw(format!("{}: ", heading)), Span::raw(item.source_ref.clone())]),
        Line::from(Span::styled(detail, Style::default().fg(app.theme.muted_fg))),
    ];

    if app.finished {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "End of playlist",
            Style::default().fg(app.theme.muted_fg),
        )));
    }

    let stage = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(stage, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let text = match &app.status {
        Some(status) => Line::from(Span::styled(format!(" {}", status), Style::default().fg(app.theme.error_fg))),
        None => Line::from(vec![
            Span::styled(format!(" {} ", app.owner_id), Style::default().fg(app.theme.accent_colour)),
            Span::styled(HELP, Style::default().fg(app.theme.muted_fg)),
        ]),
    };

    f.render_widget(Paragraph::new(text), area);
}
