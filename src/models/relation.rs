//! Per-(user, book) relation: like, bookmark and rating state

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Stored relation row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Relation {
    pub user_id: i32,
    pub book_id: i32,
    #[sqlx(rename = "liked")]
    pub like: bool,
    pub in_bookmarks: bool,
    pub rate: Option<i16>,
}

impl Relation {
    /// Fresh relation with model defaults
    pub fn new(user_id: i32, book_id: i32) -> Self {
        Self {
            user_id,
            book_id,
            like: false,
            in_bookmarks: false,
            rate: None,
        }
    }
}

/// Relation row joined with the reader's name, used for book annotation
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ReaderRelation {
    pub book_id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(rename = "liked")]
    pub like: bool,
    pub in_bookmarks: bool,
    pub rate: Option<i16>,
}

/// A rating between 1 and 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rate(i16);

impl Rate {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Rate {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Rate::MIN)..=i64::from(Rate::MAX)).contains(&value) {
            Ok(Rate(value as i16))
        } else {
            Err(invalid_choice(&value.to_string()))
        }
    }
}

impl TryFrom<&Value> for Rate {
    type Error = String;

    /// Accepts `4` as well as `"4"`; anything else is an invalid choice
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match raw.parse::<i64>() {
            Ok(n) => Rate::try_from(n).map_err(|_| invalid_choice(&raw)),
            Err(_) => Err(invalid_choice(&raw)),
        }
    }
}

fn invalid_choice(raw: &str) -> String {
    format!("\"{}\" is not a valid choice.", raw)
}

/// PATCH body: every field is optional, `rate: null` clears the rating
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RelationPatch {
    pub like: Option<bool>,
    pub in_bookmarks: Option<bool>,
    /// 1 to 5, or null
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i16>)]
    pub rate: Option<Option<Value>>,
}

impl RelationPatch {
    /// Validate the body into the set of changes to merge
    pub fn into_changes(self) -> AppResult<RelationChanges> {
        let rate = match self.rate {
            None => None,
            Some(None) => Some(None),
            Some(Some(value)) => Some(Some(
                Rate::try_from(&value).map_err(|msg| AppError::invalid_field("rate", msg))?,
            )),
        };
        Ok(RelationChanges {
            like: self.like,
            in_bookmarks: self.in_bookmarks,
            rate,
        })
    }
}

/// Validated subset of relation fields to overwrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationChanges {
    pub like: Option<bool>,
    pub in_bookmarks: Option<bool>,
    pub rate: Option<Option<Rate>>,
}

impl RelationChanges {
    /// Overwrite only the supplied fields
    pub fn apply(&self, relation: &mut Relation) {
        if let Some(like) = self.like {
            relation.like = like;
        }
        if let Some(in_bookmarks) = self.in_bookmarks {
            relation.in_bookmarks = in_bookmarks;
        }
        if let Some(rate) = self.rate {
            relation.rate = rate.map(Rate::value);
        }
    }
}

/// Relation as returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelationView {
    pub book: i32,
    pub like: bool,
    pub in_bookmarks: bool,
    pub rate: Option<i16>,
}

impl From<Relation> for RelationView {
    fn from(relation: Relation) -> Self {
        Self {
            book: relation.book_id,
            like: relation.like,
            in_bookmarks: relation.in_bookmarks,
            rate: relation.rate,
        }
    }
}
