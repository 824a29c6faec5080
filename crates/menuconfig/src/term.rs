use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

use kconfig::{Config, Symbol, SymbolKind};

trait MenuItem {
    fn apply(&self, config: &mut Config) -> Result<(), kconfig::Error>;
    fn get_height(&self) -> u16;
    fn render(&self, f: &mut Frame, area: Rect, selected: bool);
    fn on_event(&mut self, event: KeyEvent) -> bool;
    fn on_deselect(&mut self) {}
}

struct Toggle {
    name: String,
    label: String,
    value: bool,
}

impl MenuItem for Toggle {
    fn apply(&self, config: &mut Config) -> Result<(), kconfig::Error> {
        config.set_value(&self.name, if self.value { "y" } else { "n" })
    }

    fn get_height(&self) -> u16 {
        2
    }

    fn render(&self, f: &mut Frame, area: Rect, selected: bool) {
        let block = Block::default().borders(Borders::BOTTOM);
        f.render_widget(&block, area);
        let content = Paragraph::new(format!(
            "{} {}",
            if self.value { "[x]" } else { "[ ]" },
            self.label.as_str()
        ))
        .style(if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
        f.render_widget(content, block.inner(area));
    }

    fn on_event(&mut self, event: KeyEvent) -> bool {
        if event.code == KeyCode::Enter {
            self.value = !self.value;
            true
        } else {
            false
        }
    }
}

/// Line editor for string and int symbols. Enter opens the editor, Enter
/// commits (ints only when the buffer parses), Esc cancels.
struct Input {
    name: String,
    label: String,
    kind: SymbolKind,
    value: String,
    buffer: Option<String>,
}

fn commits(kind: SymbolKind, buffer: &str) -> bool {
    match kind {
        SymbolKind::Int => buffer.parse::<i64>().is_ok(),
        _ => true,
    }
}

impl MenuItem for Input {
    fn apply(&self, config: &mut Config) -> Result<(), kconfig::Error> {
        config.set_value(&self.name, &self.value)
    }

    fn get_height(&self) -> u16 {
        2
    }

    fn render(&self, f: &mut Frame, area: Rect, selected: bool) {
        let block = Block::default().borders(Borders::BOTTOM);
        f.render_widget(&block, area);
        let text = match &self.buffer {
            Some(buffer) => format!("{}: {}_", self.label, buffer),
            None => format!("{}: {}", self.label, self.value),
        };
        let content = Paragraph::new(text).style(if selected || self.buffer.is_some() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
        f.render_widget(content, block.inner(area));
    }

    fn on_event(&mut self, event: KeyEvent) -> bool {
        match &mut self.buffer {
            Some(buffer) => {
                match event.code {
                    KeyCode::Enter => {
                        if commits(self.kind, buffer) {
                            self.value = buffer.clone();
                            self.buffer = None;
                        }
                    }
                    KeyCode::Esc => self.buffer = None,
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Char(c) => buffer.push(c),
                    _ => {}
                }
                // while editing, every key is ours
                true
            }
            None => {
                if event.code == KeyCode::Enter {
                    self.buffer = Some(self.value.clone());
                    true
                } else {
                    false
                }
            }
        }
    }

    fn on_deselect(&mut self) {
        self.buffer = None;
    }
}

struct Section {
    title: String,
    items: Vec<Box<dyn MenuItem>>,
    selected: Option<usize>,
}

impl Section {
    fn add_item(&mut self, item: Box<dyn MenuItem>) {
        self.items.push(item);
    }
}

impl MenuItem for Section {
    fn apply(&self, config: &mut Config) -> Result<(), kconfig::Error> {
        for item in &self.items {
            item.apply(config)?;
        }
        Ok(())
    }

    fn get_height(&self) -> u16 {
        if self.selected.is_some() { 0 } else { 3 }
    }

    fn render(&self, f: &mut Frame, area: Rect, selected: bool) {
        let block = Block::default().borders(Borders::ALL);
        f.render_widget(&block, area);
        if let Some(selected) = self.selected {
            let mut constraints = Vec::new();
            for item in self.items.iter() {
                let height = item.get_height();
                if height == 0 {
                    // This means that the item will instead take up the entire space
                    item.render(f, area, true);
                    return;
                }
                constraints.push(Constraint::Length(height));
            }
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(block.inner(area));
            for (i, item) in self.items.iter().enumerate() {
                item.render(f, layout[i], selected == i);
            }
        } else {
            let content = Paragraph::new(self.title.as_str()).style(if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
            f.render_widget(content, block.inner(area));
        }
    }

    fn on_event(&mut self, event: KeyEvent) -> bool {
        // Capture input if we are selected
        if let Some(selected) = self.selected {
            if self
                .items
                .get_mut(selected)
                .is_some_and(|item| item.as_mut().on_event(event))
            {
                return true;
            } else if event.code == KeyCode::Esc {
                self.items[selected].on_deselect();
                self.selected = None;
                return true;
            } else if event.code == KeyCode::Up {
                self.items[selected].on_deselect();
                self.selected.replace(if selected == 0 {
                    self.items.len() - 1
                } else {
                    selected - 1
                });
                return true;
            } else if event.code == KeyCode::Down {
                self.items[selected].on_deselect();
                self.selected.replace(if selected == self.items.len() - 1 {
                    0
                } else {
                    selected + 1
                });
                return true;
            }
        }

        if event.code == KeyCode::Enter {
            self.selected = Some(self.selected.unwrap_or(0));
            true
        } else {
            false
        }
    }

    fn on_deselect(&mut self) {
        if let Some(selected) = self.selected {
            self.items[selected].on_deselect();
        }
        self.selected = None;
    }
}

#[derive(Default)]
struct ConfigMenu {
    items: Vec<Box<dyn MenuItem>>,
    selected: usize,
}

impl ConfigMenu {
    fn add_item(&mut self, item: Box<dyn MenuItem>) {
        self.items.push(item);
    }

    fn apply(&self, config: &mut Config) -> Result<(), kconfig::Error> {
        for item in &self.items {
            item.apply(config)?;
        }
        Ok(())
    }

    fn on_event(&mut self, event: KeyEvent) -> bool {
        if self
            .items
            .get_mut(self.selected)
            .is_some_and(|item| item.as_mut().on_event(event))
        {
            return true;
        }

        if event.code == KeyCode::Up {
            self.items[self.selected].on_deselect();
            self.selected = if self.selected == 0 {
                self.items.len() - 1
            } else {
                self.selected - 1
            };
            true
        } else if event.code == KeyCode::Down {
            self.items[self.selected].on_deselect();
            self.selected = (self.selected + 1) % self.items.len();
            true
        } else {
            false
        }
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let mut constraints = Vec::new();
        for item in self.items.iter() {
            let height = item.get_height();
            if height == 0 {
                // This means that the item will instead take up the entire space
                item.render(f, area, true);
                return;
            }
            constraints.push(Constraint::Length(height));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        for (i, item) in self.items.iter().enumerate() {
            item.render(f, layout[i], i == self.selected);
        }
    }
}

fn item_for(sym: &Symbol) -> Box<dyn MenuItem> {
    let label = sym.prompt.clone().unwrap_or_else(|| sym.name.clone());
    match sym.kind {
        SymbolKind::Bool => Box::new(Toggle {
            name: sym.name.clone(),
            label,
            value: sym.enabled(),
        }),
        SymbolKind::String | SymbolKind::Int => Box::new(Input {
            name: sym.name.clone(),
            label,
            kind: sym.kind,
            value: sym.value.clone(),
            buffer: None,
        }),
    }
}

fn build_menu(config: &Config) -> ConfigMenu {
    let mut menu = ConfigMenu::default();
    let mut covered = vec![false; config.symbols().len()];
    for m in config.menus() {
        let mut section = Section {
            title: m.title.clone(),
            items: Vec::new(),
            selected: None,
        };
        for &idx in &m.symbols {
            covered[idx] = true;
            section.add_item(item_for(&config.symbols()[idx]));
        }
        // menus whose osource matched nothing render as noise, leave them out
        if section.items.is_empty() {
            continue;
        }
        menu.add_item(Box::new(section));
    }
    for (idx, sym) in config.symbols().iter().enumerate() {
        if !covered[idx] {
            menu.add_item(item_for(sym));
        }
    }
    menu
}

/// Runs the interactive menu over `config`, blocking until the user exits,
/// then writes the edited values back into the symbol table.
pub fn run(config: &mut Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut menu = build_menu(config);
    if menu.items.is_empty() {
        return Ok(());
    }

    let mut terminal = ratatui::init();
    loop {
        terminal.draw(|f| {
            let help_items_left = ["↑/↓: Navigate", "q/esc: Quit"];
            let help_items_right = ["Enter: Toggle/Edit", "Esc: Back"];
            let help_menu_height = help_items_left.len().max(help_items_right.len()) as u16;

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(help_menu_height)])
                .split(f.area());

            let config_block = Block::default().title("Config").borders(Borders::ALL);

            let help_layout = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[1]);

            f.render_widget(
                List::new(help_items_left.iter().map(|s| ListItem::new(*s)))
                    .block(Block::default().borders(Borders::NONE)),
                help_layout[0],
            );
            f.render_widget(
                List::new(help_items_right.iter().map(|s| ListItem::new(*s)))
                    .block(Block::default().borders(Borders::NONE)),
                help_layout[1],
            );

            menu.render(f, config_block.inner(layout[0]));
            f.render_widget(config_block, layout[0]);
        })?;

        if let Event::Key(key) = crossterm::event::read()? {
            if !menu.on_event(key) && (key.code == KeyCode::Char('q') || key.code == KeyCode::Esc) {
                break;
            }
        }
    }
    ratatui::restore();

    menu.apply(config)?;
    Ok(())
}
