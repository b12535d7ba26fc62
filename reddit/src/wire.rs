//! Serde payloads for the Reddit endpoints the bot touches.
//!
//! Only the fields the bot reads are modeled; everything else in the
//! responses is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct AboutResponse {
    pub data: AboutData,
}

#[derive(Debug, Deserialize)]
pub struct AboutData {
    pub created_utc: f64,
    #[serde(default)]
    pub is_suspended: bool,
}

/// Generic `Listing` wrapper used by comment and message feeds.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    pub subreddit: String,
    pub created_utc: f64,
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageData {
    /// Fullname, e.g. `t4_1cehp6`.
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub was_comment: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModNotesResponse {
    pub mod_notes: Vec<ModNoteData>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModNoteData {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct UserList {
    pub data: UserListData,
}

#[derive(Debug, Deserialize)]
pub struct UserListData {
    pub children: Vec<UserListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UserListEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: std::collections::HashMap<String, Conversation>,
}

#[derive(Debug, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub authors: Vec<UserListEntry>,
    #[serde(rename = "numMessages", default)]
    pub num_messages: u64,
}
