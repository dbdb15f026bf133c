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

//! Render the player bar.
//!
//! Shows what is on stage, whether it is playing, where it sits in the
//! playlist and, for slides, how long is left.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    model::SourceKind,
    playback::PlaybackSnapshot,
    render::icons::{ICON_FULLSCREEN, ICON_LOOP, ICON_PAUSE, ICON_PLAY, ICON_STOP},
    util,
};

/// Renders the player bar: item line, status line and countdown gauge.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App, snapshot: &PlaybackSnapshot) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let Some(item) = &snapshot.current_item else {
        f.render_widget(Paragraph::new(Span::styled(format!(" {} ", ICON_STOP), bold)), info_chunks[0]);
        return;
    };

    let icon = if app.finished {
        ICON_STOP
    } else if snapshot.is_playing {
        ICON_PLAY
    } else {
        ICON_PAUSE
    };

    let item_line = Line::from(vec![
        Span::styled(format!(" {} ", icon), bold).fg(app.theme.item_fg),
        Span::styled(item.title.clone(), bold).fg(app.theme.accent_colour),
        Span::raw(format!(" [{}]", item.source_kind)).fg(app.theme.muted_fg),
    ]);
    f.render_widget(Paragraph::new(item_line), info_chunks[0]);

    let time_text = match (item.source_kind, snapshot.remaining_time) {
        (SourceKind::Timed, Some(remaining)) => format!("-{}", util::format::format_time(remaining)),
        (SourceKind::Timed, None) => "--:--".to_string(),
        (SourceKind::Push, _) => String::new(),
    };
    let time_p = Paragraph::new(Span::styled(time_text, bold).fg(app.theme.accent_colour))
        .alignment(Alignment::Right);
    f.render_widget(time_p, info_chunks[1]);

    let position = util::format::format_position(snapshot.current_index, snapshot.len);
    let mut status = vec![Span::raw(format!(" {}", position)).fg(app.theme.muted_fg)];
    if snapshot.loop_enabled {
        status.push(Span::styled(format!("  {} loop", ICON_LOOP), bold).fg(app.theme.accent_colour));
    }
    if app.presentation.is_fullscreen() {
        status.push(Span::styled(format!("  {} fullscreen", ICON_FULLSCREEN), bold).fg(app.theme.accent_colour));
    }
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    if item.source_kind == SourceKind::Timed {
        let ratio = util::format::countdown_ratio(snapshot.remaining_time, app.slide_duration_secs);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(app.theme.accent_colour).bg(app.theme.gauge_track_colour))
            .ratio(ratio)
            .label("")
            .use_unicode(true);
        f.render_widget(gauge, chunks[2]);
    }
}
