//! Screen paths.
//!
//! Every kind gets the same four screens:
//!
//! | Path | Screen |
//! |------|--------|
//! | `/<segment>` | [`Screen::List`] |
//! | `/<segment>/new` | [`Screen::Create`] |
//! | `/<segment>/<id>/view` | [`Screen::View`] |
//! | `/<segment>/<id>/edit` | [`Screen::Edit`] |
//!
//! Query strings, fragments and trailing slashes are ignored when parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use etudiant_rs_core::{AppError, AppResult};
use etudiant_rs_model::{EntityKind, Id};

/// Which screen of a kind is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    List,
    Create,
    View(Id),
    Edit(Id),
}

impl Screen {
    /// The identifier the screen works on, if any.
    pub const fn id(self) -> Option<Id> {
        match self {
            Self::View(id) | Self::Edit(id) => Some(id),
            Self::List | Self::Create => None,
        }
    }

    /// Returns `true` for the screens that host an update form.
    pub const fn is_form(self) -> bool {
        matches!(self, Self::Create | Self::Edit(_))
    }
}

/// A resolved screen path.
///
/// # Examples
///
/// ```
/// use etudiant_rs_model::EntityKind;
/// use etudiant_rs_routing::{Route, Screen};
///
/// let route: Route = "/etudiant/12/edit".parse().unwrap();
/// assert_eq!(route, Route::new(EntityKind::Student, Screen::Edit(12)));
/// assert_eq!(route.to_string(), "/etudiant/12/edit");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub kind: EntityKind,
    pub screen: Screen,
}

impl Route {
    pub const fn new(kind: EntityKind, screen: Screen) -> Self {
        Self { kind, screen }
    }

    pub const fn list(kind: EntityKind) -> Self {
        Self::new(kind, Screen::List)
    }

    pub const fn create(kind: EntityKind) -> Self {
        Self::new(kind, Screen::Create)
    }

    pub const fn view(kind: EntityKind, id: Id) -> Self {
        Self::new(kind, Screen::View(id))
    }

    pub const fn edit(kind: EntityKind, id: Id) -> Self {
        Self::new(kind, Screen::Edit(id))
    }

    /// Parses a screen path.
    pub fn parse(path: &str) -> AppResult<Self> {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_matches('/');
        let parts: Vec<&str> = bare.split('/').filter(|p| !p.is_empty()).collect();

        let unknown = || AppError::InvalidRoute(format!("no screen matches '{path}'"));
        let kind = parts
            .first()
            .and_then(|segment| EntityKind::from_segment(segment))
            .ok_or_else(unknown)?;

        let screen = match parts.as_slice() {
            [_] => Screen::List,
            [_, "new"] => Screen::Create,
            [_, id, action] => {
                let id: Id = id.parse().map_err(|_| unknown())?;
                match *action {
                    "view" => Screen::View(id),
                    "edit" => Screen::Edit(id),
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };
        Ok(Self { kind, screen })
    }

    /// The page title shown for this route.
    pub const fn title(&self) -> &'static str {
        self.kind.page_title()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segment = self.kind.segment();
        match self.screen {
            Screen::List => write!(f, "/{segment}"),
            Screen::Create => write!(f, "/{segment}/new"),
            Screen::View(id) => write!(f, "/{segment}/{id}/view"),
            Screen::Edit(id) => write!(f, "/{segment}/{id}/edit"),
        }
    }
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
