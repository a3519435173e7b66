use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::binder::PlaybackBinder;
use crate::app::prompt::{OpenPrompt, PromptFocus};
use crate::app::{decrement, increment};
use crate::config::Config;
use crate::player::commands::PlaybackStatus;
use crate::player::engine::{MediaEngine, MediaSource};
use crate::ui::loading::LoadingAnimation;
use crate::ui::slider::value_at_column;

#[derive(Default, Clone)]
pub struct LayoutRegions {
    pub menu_bar: Option<Rect>,
    pub file_menu: Option<Rect>,
    pub play_pause: Option<Rect>,
    pub full_screen: Option<Rect>,
    pub time_slider: Option<Rect>,
    pub volume_slider: Option<Rect>,
    pub prompt_browse: Option<Rect>,
    pub prompt_open: Option<Rect>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Control {
    PlayPause,
    FullScreen,
    TimeSlider,
    VolumeSlider,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MenuItem {
    Open,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Open, MenuItem::Exit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Open => "Open media file...",
            MenuItem::Exit => "Exit",
        }
    }
}

pub struct App<E: MediaEngine> {
    pub binder: PlaybackBinder<E>,
    pub media: Option<MediaSource>,
    pub controls_enabled: bool,

    pub prompt: Option<OpenPrompt>,
    pub menu_open: bool,
    pub menu_index: usize,

    pub focus: Control,
    pub full_screen: bool,
    pub should_quit: bool,

    pub seek_step: f64,
    pub volume_step: f64,
    pub home_dir: PathBuf,

    pub loading: LoadingAnimation,
    pub layout_regions: LayoutRegions,
    mouse_drag: Option<Control>,
}

fn point_in_rect(x: u16, y: u16, rect: &Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn hit(region: Option<Rect>, x: u16, y: u16) -> Option<Rect> {
    region.filter(|r| point_in_rect(x, y, r))
}

impl<E: MediaEngine> App<E> {
    pub fn new(engine: E, config: &Config) -> Self {
        Self {
            binder: PlaybackBinder::new(engine),
            media: None,
            controls_enabled: false,

            prompt: None,
            menu_open: false,
            menu_index: 0,

            focus: Control::PlayPause,
            full_screen: false,
            should_quit: false,

            seek_step: config.seek_step,
            volume_step: config.volume_step,
            home_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),

            loading: LoadingAnimation::new(),
            layout_regions: LayoutRegions::default(),
            mouse_drag: None,
        }
    }

    // Engine notifications, already marshalled onto the UI thread.

    pub fn on_status_changed(&mut self, status: PlaybackStatus) {
        self.binder.on_status_changed(status);
    }

    pub fn on_current_time_changed(&mut self, elapsed: Duration) {
        self.binder.on_current_time_changed(elapsed);
    }

    pub fn on_end_of_media(&mut self) {
        self.binder.on_end_of_media();
    }

    pub fn on_load_failed(&mut self, error: String) {
        tracing::warn!("media failed to load: {error}");
        self.media = None;
        self.controls_enabled = false;
    }

    pub fn on_engine_error(&mut self, error: String) {
        tracing::error!("engine: {error}");
    }

    pub fn tick(&mut self) {
        if self.media.is_some() && self.binder.status() == PlaybackStatus::Unknown {
            self.loading.tick();
        }
    }

    // Menu and prompt

    pub fn open_prompt(&mut self) {
        self.menu_open = false;
        self.prompt = Some(OpenPrompt::new());
    }

    fn activate_menu_item(&mut self, item: MenuItem) {
        self.menu_open = false;
        match item {
            MenuItem::Open => self.open_prompt(),
            MenuItem::Exit => self.should_quit = true,
        }
    }

    pub fn submit_prompt(&mut self) {
        let Some(uri) = self
            .prompt
            .as_ref()
            .and_then(|p| p.submission())
            .map(str::to_string)
        else {
            tracing::debug!("ignoring implausible media location");
            return;
        };

        match self.binder.load(&uri) {
            Ok(source) => {
                tracing::info!("opened {}", source.display_name());
                self.media = Some(source);
                self.prompt = None;
                self.controls_enabled = true;
            }
            Err(e) => tracing::warn!("cannot open `{uri}`: {e}"),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let home_dir = self.home_dir.clone();
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        if let Some(browser) = prompt.browser.as_mut() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => browser.next(),
                KeyCode::Char('k') | KeyCode::Up => browser.previous(),
                KeyCode::Enter => prompt.activate_browser_selection(),
                KeyCode::Esc => prompt.close_browser(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Tab => prompt.cycle_focus(false),
            KeyCode::BackTab => prompt.cycle_focus(true),
            KeyCode::Enter => match prompt.focus {
                PromptFocus::Browse => prompt.open_browser(home_dir),
                PromptFocus::Text | PromptFocus::Open => self.submit_prompt(),
            },
            KeyCode::Backspace if prompt.focus == PromptFocus::Text => prompt.backspace(),
            KeyCode::Char(c) if prompt.focus == PromptFocus::Text => prompt.insert_char(c),
            _ => {}
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let len = MenuItem::ALL.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_index = increment(self.menu_index, len, true)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_index = decrement(self.menu_index, len, true)
            }
            KeyCode::Enter => self.activate_menu_item(MenuItem::ALL[self.menu_index]),
            KeyCode::Esc | KeyCode::F(10) | KeyCode::Char('f') => self.menu_open = false,
            _ => {}
        }
    }

    // Controls

    pub fn cycle_focus(&mut self, reverse: bool) {
        self.focus = match (self.focus, reverse) {
            (Control::PlayPause, false) => Control::FullScreen,
            (Control::FullScreen, false) => Control::TimeSlider,
            (Control::TimeSlider, false) => Control::VolumeSlider,
            (Control::VolumeSlider, false) => Control::PlayPause,

            (Control::PlayPause, true) => Control::VolumeSlider,
            (Control::FullScreen, true) => Control::PlayPause,
            (Control::TimeSlider, true) => Control::FullScreen,
            (Control::VolumeSlider, true) => Control::TimeSlider,
        };
    }

    pub fn toggle_full_screen(&mut self) {
        self.full_screen = !self.full_screen;
    }

    fn activate_control(&mut self, control: Control) {
        match control {
            Control::PlayPause => self.binder.toggle_playback(),
            Control::FullScreen => self.toggle_full_screen(),
            Control::TimeSlider | Control::VolumeSlider => {}
        }
    }

    /// Arrow keys move a slider as a single-step drag.
    fn step_slider(&mut self, control: Control, direction: f64) {
        match control {
            Control::TimeSlider => {
                let target = self.binder.time_slider().value() + direction * self.seek_step;
                if self.binder.begin_seek_drag() {
                    self.binder.seek_dragged(target);
                    self.binder.end_seek_drag();
                }
            }
            Control::VolumeSlider => {
                let target = self.binder.volume_slider().value() + direction * self.volume_step;
                if self.binder.begin_volume_drag() {
                    self.binder.volume_dragged(target);
                    self.binder.end_volume_drag();
                }
            }
            Control::PlayPause | Control::FullScreen => {}
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        if self.menu_open {
            self.handle_menu_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::F(10) | KeyCode::Char('f') => {
                self.menu_open = true;
                self.menu_index = 0;
            }
            KeyCode::Char('o') => self.open_prompt(),
            KeyCode::Esc if self.full_screen => self.full_screen = false,
            _ if !self.controls_enabled => {}
            KeyCode::Tab => self.cycle_focus(false),
            KeyCode::BackTab => self.cycle_focus(true),
            KeyCode::Char(' ') => self.binder.toggle_playback(),
            KeyCode::Enter => self.activate_control(self.focus),
            KeyCode::Char('l') | KeyCode::Right => self.step_slider(self.focus, 1.0),
            KeyCode::Char('h') | KeyCode::Left => self.step_slider(self.focus, -1.0),
            _ => {}
        }
    }

    fn handle_prompt_click(&mut self, x: u16, y: u16) {
        let home_dir = self.home_dir.clone();
        let regions = self.layout_regions.clone();
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        if prompt.browser.is_some() {
            return;
        }

        if hit(regions.prompt_browse, x, y).is_some() {
            prompt.focus = PromptFocus::Browse;
            prompt.open_browser(home_dir);
        } else if hit(regions.prompt_open, x, y).is_some() {
            prompt.focus = PromptFocus::Open;
            self.submit_prompt();
        }
    }

    fn handle_menu_click(&mut self, x: u16, y: u16) -> bool {
        if let Some(menu) = hit(self.layout_regions.file_menu, x, y) {
            if self.menu_open && y > menu.y {
                let index = (y - menu.y - 1) as usize;
                if let Some(item) = MenuItem::ALL.get(index) {
                    self.activate_menu_item(*item);
                }
            }
            return true;
        }

        if hit(self.layout_regions.menu_bar, x, y).is_some() {
            self.menu_open = !self.menu_open;
            self.menu_index = 0;
            return true;
        }

        if self.menu_open {
            self.menu_open = false;
            return true;
        }

        false
    }

    fn slider_value(&self, control: Control, column: u16) -> Option<f64> {
        let region = match control {
            Control::TimeSlider => self.layout_regions.time_slider,
            Control::VolumeSlider => self.layout_regions.volume_slider,
            _ => None,
        }?;
        Some(value_at_column(region, column))
    }

    fn drag_slider(&mut self, control: Control, column: u16) {
        let Some(value) = self.slider_value(control, column) else {
            return;
        };
        match control {
            Control::TimeSlider => self.binder.seek_dragged(value),
            Control::VolumeSlider => self.binder.volume_dragged(value),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let (x, y) = (event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.prompt.is_some() {
                    self.handle_prompt_click(x, y);
                    return;
                }

                if self.handle_menu_click(x, y) || !self.controls_enabled {
                    return;
                }

                let regions = &self.layout_regions;
                if hit(regions.play_pause, x, y).is_some() {
                    self.focus = Control::PlayPause;
                    self.activate_control(Control::PlayPause);
                } else if hit(regions.full_screen, x, y).is_some() {
                    self.focus = Control::FullScreen;
                    self.activate_control(Control::FullScreen);
                } else if hit(regions.time_slider, x, y).is_some() {
                    self.focus = Control::TimeSlider;
                    if self.binder.begin_seek_drag() {
                        self.mouse_drag = Some(Control::TimeSlider);
                        self.drag_slider(Control::TimeSlider, x);
                    }
                } else if hit(regions.volume_slider, x, y).is_some() {
                    self.focus = Control::VolumeSlider;
                    if self.binder.begin_volume_drag() {
                        self.mouse_drag = Some(Control::VolumeSlider);
                        self.drag_slider(Control::VolumeSlider, x);
                    }
                }
            }

            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(control) = self.mouse_drag {
                    self.drag_slider(control, x);
                }
            }

            MouseEventKind::Up(MouseButton::Left) => match self.mouse_drag.take() {
                Some(Control::TimeSlider) => self.binder.end_seek_drag(),
                Some(Control::VolumeSlider) => self.binder.end_volume_drag(),
                _ => {}
            },

            MouseEventKind::Down(MouseButton::Middle) if self.controls_enabled => {
                self.binder.toggle_playback();
            }

            MouseEventKind::ScrollUp if self.controls_enabled => {
                self.step_slider(Control::VolumeSlider, 1.0);
            }

            MouseEventKind::ScrollDown if self.controls_enabled => {
                self.step_slider(Control::VolumeSlider, -1.0);
            }

            _ => {}
        }
    }
}
