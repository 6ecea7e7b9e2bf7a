use crate::geo::Coordinates;
use crate::search::{parse_distance, FilterUpdate, SearchFilters, SortOrder};

/// The type of action available in the actions menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Details,
    OpenInBrowser,
    CopyLink,
}

/// Actions popup menu state
pub struct ActionsMenu {
    pub items: Vec<(&'static str, ActionKind)>,
    pub selected: usize,
}

impl ActionsMenu {
    pub fn new() -> Self {
        Self {
            items: vec![
                ("View details", ActionKind::Details),
                ("Open in browser", ActionKind::OpenInBrowser),
                ("Copy link", ActionKind::CopyLink),
            ],
            selected: 0,
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected < self.items.len() - 1 {
            self.selected += 1;
        }
    }

    pub fn selected_action(&self) -> ActionKind {
        self.items[self.selected].1
    }
}

impl Default for ActionsMenu {
    fn default() -> Self {
        Self::new()
    }
}

/// Which field is focused in the search filters dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Condition,
    Location,
    Near,
    Distance,
    Sort,
    Apply,
    Clear,
    Cancel,
}

impl FilterField {
    pub fn next(&self) -> Self {
        match self {
            FilterField::Category => FilterField::Condition,
            FilterField::Condition => FilterField::Location,
            FilterField::Location => FilterField::Near,
            FilterField::Near => FilterField::Distance,
            FilterField::Distance => FilterField::Sort,
            FilterField::Sort => FilterField::Apply,
            FilterField::Apply => FilterField::Clear,
            FilterField::Clear => FilterField::Cancel,
            FilterField::Cancel => FilterField::Category,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FilterField::Category => FilterField::Cancel,
            FilterField::Condition => FilterField::Category,
            FilterField::Location => FilterField::Condition,
            FilterField::Near => FilterField::Location,
            FilterField::Distance => FilterField::Near,
            FilterField::Sort => FilterField::Distance,
            FilterField::Apply => FilterField::Sort,
            FilterField::Clear => FilterField::Apply,
            FilterField::Cancel => FilterField::Clear,
        }
    }

    pub fn is_text_input(&self) -> bool {
        matches!(
            self,
            FilterField::Category
                | FilterField::Condition
                | FilterField::Location
                | FilterField::Near
                | FilterField::Distance
        )
    }

    pub fn is_mode_selector(&self) -> bool {
        matches!(self, FilterField::Sort)
    }
}

/// A single-line text input with its cursor
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub text: String,
    pub cursor: usize,
}

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Search filters dialog state
pub struct FiltersMenu {
    pub focused_field: FilterField,
    pub category: TextField,
    pub condition: TextField,
    pub location: TextField,
    pub near: TextField,
    pub distance: TextField,
    pub sort: SortOrder,
}

impl FiltersMenu {
    /// Open the dialog pre-filled from the active filters
    pub fn from_filters(filters: &SearchFilters) -> Self {
        Self {
            focused_field: FilterField::Category,
            category: TextField::new(filters.category.clone()),
            condition: TextField::new(filters.condition.clone()),
            location: TextField::new(filters.location.clone()),
            near: TextField::new(
                filters
                    .coordinates
                    .map(|c| format!("{},{}", c.lat, c.lng))
                    .unwrap_or_default(),
            ),
            distance: TextField::new(filters.distance.to_string()),
            sort: filters.sort,
        }
    }

    /// Get the current text input for the focused field
    pub fn current_text_mut(&mut self) -> Option<&mut TextField> {
        match self.focused_field {
            FilterField::Category => Some(&mut self.category),
            FilterField::Condition => Some(&mut self.condition),
            FilterField::Location => Some(&mut self.location),
            FilterField::Near => Some(&mut self.near),
            FilterField::Distance => Some(&mut self.distance),
            _ => None,
        }
    }

    pub fn clear_all(&mut self) {
        *self = FiltersMenu::from_filters(&SearchFilters::default());
        self.focused_field = FilterField::Clear;
    }

    /// Turn the dialog contents into a filter update.
    ///
    /// The query is owned by the search bar and is never touched here.
    pub fn to_update(&self) -> Result<FilterUpdate, String> {
        let distance_text = self.distance.text.trim();
        let distance = if distance_text.is_empty() {
            crate::search::filters::DEFAULT_DISTANCE_KM
        } else {
            parse_distance(distance_text)?
        };

        let near_text = self.near.text.trim();
        let coordinates = if near_text.is_empty() {
            None
        } else {
            Some(near_text.parse::<Coordinates>()?)
        };

        Ok(FilterUpdate {
            query: None,
            category: Some(self.category.text.trim().to_string()),
            location: Some(self.location.text.trim().to_string()),
            condition: Some(self.condition.text.trim().to_string()),
            distance: Some(distance),
            sort: Some(self.sort),
            coordinates: Some(coordinates),
        })
    }
}

/// Info dialog for displaying multi-line information
pub struct InfoDialog {
    pub title: String,
    pub lines: Vec<String>,
}

impl InfoDialog {
    pub fn new(title: String, lines: Vec<String>) -> Self {
        Self { title, lines }
    }
}

/// Which menu/dialog is currently active
pub enum ActiveMenu {
    None,
    Actions(ActionsMenu),
    Filters(FiltersMenu),
    Info(InfoDialog),
}

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_owned()))
        .map_err(|e| e.to_string())
}

/// Open a URL with the default browser
pub fn open_url(url: &str) -> Result<(), String> {
    open::that(url).map_err(|e| e.to_string())
}
