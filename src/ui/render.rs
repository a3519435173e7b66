use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::binder::PlayIcon,
    app::prompt::{OpenPrompt, PromptFocus},
    app::state::{App, Control, LayoutRegions, MenuItem},
    player::commands::PlaybackStatus,
    player::engine::MediaEngine,
    ui::{slider::Slider, theme::get_theme},
};

const ROUNDED_BORDER: border::Set = border::ROUNDED;
const MENU_LABEL: &str = " File ";
const PROMPT_WIDTH: u16 = 64;
const PROMPT_HEIGHT: u16 = 7;
const BROWSER_HEIGHT: u16 = 16;

fn block_with_title(title: &'_ str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(ROUNDED_BORDER)
        .title(title)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render<E: MediaEngine>(f: &mut Frame, app: &mut App<E>) {
    let theme = get_theme();
    let area = f.area();
    app.layout_regions = LayoutRegions::default();

    let background = Block::default().style(Style::default().bg(theme.bg));
    f.render_widget(background, area);

    let (chrome_top, chrome_bottom) = if app.full_screen { (0, 0) } else { (3, 3) };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(chrome_top),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(chrome_bottom),
        ])
        .split(area);

    if !app.full_screen {
        draw_menu_bar(f, chunks[0], app);
        draw_footer(f, chunks[3], app);
    }
    draw_playback_surface(f, chunks[1], app);
    draw_control_pane(f, chunks[2], app);

    if app.menu_open {
        draw_file_menu(f, chunks[0], app);
    }

    if let Some(ref prompt) = app.prompt {
        let regions = draw_prompt(f, area, prompt);
        app.layout_regions.prompt_browse = regions.prompt_browse;
        app.layout_regions.prompt_open = regions.prompt_open;
    }
}

fn draw_menu_bar<E: MediaEngine>(f: &mut Frame, area: Rect, app: &mut App<E>) {
    let theme = get_theme();
    let block = block_with_title(" Triton Player ").border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let label_style = if app.menu_open {
        theme.selection_style()
    } else {
        theme.header_style()
    };
    f.render_widget(Paragraph::new(Span::styled(MENU_LABEL, label_style)), inner);

    app.layout_regions.menu_bar = Some(Rect {
        width: (MENU_LABEL.len() as u16).min(inner.width),
        height: 1,
        ..inner
    });
}

fn draw_file_menu<E: MediaEngine>(f: &mut Frame, menu_bar: Rect, app: &mut App<E>) {
    let theme = get_theme();
    let width = MenuItem::ALL
        .iter()
        .map(|item| item.label().len() as u16)
        .max()
        .unwrap_or(0)
        + 4;
    let area = Rect {
        x: menu_bar.x + 1,
        y: menu_bar.y + 2,
        width,
        height: MenuItem::ALL.len() as u16 + 2,
    }
    .intersection(f.area());

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.menu_index {
                theme.selection_style()
            } else {
                theme.value_style()
            };
            ListItem::new(format!(" {}", item.label())).style(style)
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        List::new(items).block(
            block_with_title("")
                .border_style(theme.border_style(true))
                .style(theme.surface_style()),
        ),
        area,
    );

    app.layout_regions.file_menu = Some(area);
}

fn draw_playback_surface<E: MediaEngine>(f: &mut Frame, area: Rect, app: &App<E>) {
    let theme = get_theme();

    let Some(ref media) = app.media else {
        let block = block_with_title("").border_style(theme.border_style(false));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let hint = Paragraph::new("File ▸ Open media file... (o)")
            .alignment(Alignment::Center)
            .style(theme.label_style());
        f.render_widget(
            hint,
            Rect {
                y: inner.y + inner.height / 2,
                height: inner.height.min(1),
                ..inner
            },
        );
        return;
    };

    let title = format!(" ● {} ", media.display_name());
    let block = block_with_title(&title).border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let status = app.binder.status();
    let status_line = match status {
        PlaybackStatus::Unknown => Line::from(vec![
            Span::styled(app.loading.current_frame(), Style::new().fg(theme.accent)),
            Span::styled(" Loading", theme.label_style()),
        ]),
        PlaybackStatus::Playing => Line::from(Span::styled(
            status.label(),
            Style::new().fg(theme.playing),
        )),
        PlaybackStatus::Halted => Line::from(Span::styled(
            status.label(),
            Style::new().fg(theme.accent_alt),
        )),
        _ => Line::from(Span::styled(status.label(), Style::new().fg(theme.paused))),
    };

    let mut lines = vec![
        Line::from(Span::styled(media.display_name(), theme.title_style())),
        Line::from(""),
        status_line,
        Line::from(""),
        Line::from(Span::styled(app.binder.time_label(), theme.value_style())),
    ];
    if app.binder.total().is_none() && status != PlaybackStatus::Unknown {
        lines.push(Line::from(Span::styled("length unknown", theme.label_style())));
    }

    let height = (lines.len() as u16).min(inner.height);
    let text_area = Rect {
        y: inner.y + inner.height.saturating_sub(height) / 2,
        height,
        ..inner
    };
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        text_area,
    );
}

fn draw_control_pane<E: MediaEngine>(f: &mut Frame, area: Rect, app: &mut App<E>) {
    let theme = get_theme();
    let enabled = app.controls_enabled;

    let block = block_with_title("").border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let label_width = (app.binder.time_label().chars().count() as u16).max(11);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(label_width),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(12),
        ])
        .split(inner);

    let control_style = |control: Control| {
        if !enabled {
            theme.disabled_style()
        } else if app.focus == control {
            theme.selection_style()
        } else {
            theme.value_style()
        }
    };

    let play_icon = match app.binder.play_icon() {
        PlayIcon::Play => " ▶ ",
        PlayIcon::Pause => " ⏸ ",
    };
    f.render_widget(
        Paragraph::new(play_icon).style(control_style(Control::PlayPause)),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(" ⛶ ").style(control_style(Control::FullScreen)),
        chunks[2],
    );

    let playing = app.binder.status() == PlaybackStatus::Playing;
    draw_slider(
        f,
        chunks[4],
        app.binder.time_slider(),
        enabled,
        app.focus == Control::TimeSlider,
        playing,
    );

    let label_style = if enabled {
        theme.value_style()
    } else {
        theme.disabled_style()
    };
    f.render_widget(
        Paragraph::new(app.binder.time_label()).style(label_style),
        chunks[6],
    );
    f.render_widget(Paragraph::new(" ♪ ").style(label_style), chunks[8]);
    draw_slider(
        f,
        chunks[9],
        app.binder.volume_slider(),
        enabled,
        app.focus == Control::VolumeSlider,
        true,
    );

    app.layout_regions.play_pause = Some(chunks[0]);
    app.layout_regions.full_screen = Some(chunks[2]);
    app.layout_regions.time_slider = Some(chunks[4]);
    app.layout_regions.volume_slider = Some(chunks[9]);
}

fn draw_slider(
    f: &mut Frame,
    area: Rect,
    slider: &Slider,
    enabled: bool,
    focused: bool,
    playing: bool,
) {
    let theme = get_theme();
    let width = area.width as usize;
    if width == 0 {
        return;
    }

    let enabled = enabled && !slider.is_disabled();
    let knob = ((slider.fraction() * (width - 1) as f64).round() as usize).min(width - 1);

    let filled: String = "━".repeat(knob);
    let rest: String = "─".repeat(width - knob - 1);

    let (fill_style, knob_style, rest_style) = if !enabled {
        let dim = theme.disabled_style();
        (dim, dim, dim)
    } else {
        let fill = Style::new().fg(theme.slider_color(playing));
        let knob = if focused || slider.is_dragging() {
            Style::new().fg(theme.border_focused)
        } else {
            fill
        };
        (fill, knob, Style::new().fg(theme.fg_dim))
    };

    let spans = vec![
        Span::styled(filled, fill_style),
        Span::styled("●", knob_style),
        Span::styled(rest, rest_style),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_prompt(f: &mut Frame, area: Rect, prompt: &OpenPrompt) -> LayoutRegions {
    let theme = get_theme();
    let mut regions = LayoutRegions::default();

    let height = if prompt.browser.is_some() {
        PROMPT_HEIGHT + BROWSER_HEIGHT
    } else {
        PROMPT_HEIGHT
    };
    let modal = centered_rect(PROMPT_WIDTH, height, area);
    f.render_widget(Clear, modal);

    let block = block_with_title(" Open media file ")
        .border_style(theme.border_style(true))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(modal);
    f.render_widget(block, modal);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Enter URL or browse for a local file:").style(theme.label_style()),
        chunks[0],
    );

    let text_style = if prompt.focus == PromptFocus::Text {
        theme.selection_style()
    } else {
        theme.surface_style()
    };
    let cursor = if prompt.focus == PromptFocus::Text { "▏" } else { "" };
    // Keep the tail of long input visible.
    let visible: String = {
        let max = chunks[1].width.saturating_sub(2) as usize;
        let count = prompt.text.chars().count();
        prompt.text.chars().skip(count.saturating_sub(max)).collect()
    };
    f.render_widget(
        Paragraph::new(format!(" {}{}", visible, cursor)).style(text_style),
        chunks[1],
    );

    let button_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(11),
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Min(0),
        ])
        .split(chunks[3]);

    let button_style = |focus: PromptFocus| {
        if prompt.focus == focus {
            theme.selection_style()
        } else {
            theme.value_style()
        }
    };
    f.render_widget(
        Paragraph::new("[Browse...]").style(button_style(PromptFocus::Browse)),
        button_row[1],
    );
    f.render_widget(
        Paragraph::new("[ Open ]").style(button_style(PromptFocus::Open)),
        button_row[3],
    );
    regions.prompt_browse = Some(button_row[1]);
    regions.prompt_open = Some(button_row[3]);

    if let Some(ref browser) = prompt.browser {
        let title = format!(" {} ", browser.dir().display());
        let items: Vec<ListItem> = browser
            .entries()
            .iter()
            .map(|entry| {
                let (prefix, style) = if entry.is_dir {
                    ("▸ ", Style::new().fg(theme.accent))
                } else {
                    ("  ", theme.value_style())
                };
                ListItem::new(format!("{}{}", prefix, entry.name)).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(block_with_title(&title).border_style(theme.border_style(true)))
            .highlight_style(theme.selection_style());
        let mut list_state = ListState::default().with_selected(Some(browser.selected()));
        f.render_stateful_widget(list, chunks[4], &mut list_state);
    }

    regions
}

fn draw_footer<E: MediaEngine>(f: &mut Frame, area: Rect, app: &App<E>) {
    let theme = get_theme();
    let keybinds = if app.prompt.is_some() {
        "Type a path or URL | Tab: Field | Enter: Activate | Esc: Cancel"
    } else if app.menu_open {
        "↑↓/jk: Navigate | Enter: Select | Esc: Close"
    } else if app.controls_enabled {
        "Space: Play/Pause | Tab: Focus | ←→/hl: Slider | Enter: Button | f: Menu | o: Open | q: Quit"
    } else {
        "f/F10: Menu | o: Open media file | q: Quit"
    };

    f.render_widget(
        Paragraph::new(keybinds)
            .style(theme.label_style())
            .block(block_with_title("").border_style(theme.border_style(false))),
        area,
    );
}
