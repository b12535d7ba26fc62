//! The blocking Reddit client.

use std::cell::RefCell;

use serde::de::DeserializeOwned;

use modgate_platform::{AccountDirectory, InboxMessage, Mailbox, PlatformError, ReportSink};
use modgate_types::{Account, AccountHandle, Comment, CommunityId, ModNote, Timestamp};

use crate::config::RedditConfig;
use crate::wire;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE: &str = "https://oauth.reddit.com";
/// Largest page size Reddit serves per request.
const PAGE_SIZE: usize = 100;
/// Refresh the token this many seconds before it actually expires.
const TOKEN_SLACK_SECS: u64 = 60;

struct CachedToken {
    token: String,
    expires_at: Timestamp,
}

/// Script-app Reddit client serving one community.
pub struct RedditClient {
    http: reqwest::blocking::Client,
    credentials: RedditConfig,
    community: CommunityId,
    bot_handle: AccountHandle,
    failed_report_conversation: String,
    token: RefCell<Option<CachedToken>>,
}

impl RedditClient {
    pub fn new(
        credentials: RedditConfig,
        community: CommunityId,
        bot_handle: AccountHandle,
        failed_report_conversation: String,
        user_agent: &str,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        Ok(Self {
            http,
            credentials,
            community,
            bot_handle,
            failed_report_conversation,
            token: RefCell::new(None),
        })
    }

    /// A valid bearer token, refreshed via the password grant when the cached
    /// one is absent or close to expiry.
    fn bearer(&self) -> Result<String, PlatformError> {
        if let Some(cached) = self.token.borrow().as_ref() {
            if Timestamp::now().saturating_add_secs(TOKEN_SLACK_SECS) < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!("requesting new access token");
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PlatformError::Auth(format!(
                "token request returned {}",
                response.status()
            )));
        }
        let parsed: wire::TokenResponse = response
            .json()
            .map_err(|e| PlatformError::Auth(e.to_string()))?;

        let token = parsed.access_token.clone();
        *self.token.borrow_mut() = Some(CachedToken {
            token: parsed.access_token,
            expires_at: Timestamp::now().saturating_add_secs(parsed.expires_in),
        });
        Ok(token)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let token = self.bearer()?;
        let response = self
            .http
            .get(format!("{OAUTH_BASE}{path}"))
            .query(query)
            .bearer_auth(token)
            .send()
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(PlatformError::Api(format!("GET {path} returned {status}")));
        }
        response
            .json()
            .map_err(|e| PlatformError::Api(format!("GET {path}: {e}")))
    }

    /// POST a form and return the raw response body.
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String, PlatformError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(format!("{OAUTH_BASE}{path}"))
            .form(form)
            .bearer_auth(token)
            .send()
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Api(format!("POST {path} returned {status}")));
        }
        response
            .text()
            .map_err(|e| PlatformError::Http(e.to_string()))
    }
}

impl AccountDirectory for RedditClient {
    fn resolve(&self, handle: &AccountHandle) -> Result<Account, PlatformError> {
        let about: wire::AboutResponse =
            match self.get_json(&format!("/user/{handle}/about"), &[]) {
                Ok(about) => about,
                Err(PlatformError::NotFound(_)) => {
                    return Err(PlatformError::NotFound(handle.to_string()))
                }
                Err(e) => return Err(e),
            };
        Ok(Account {
            handle: handle.clone(),
            created: Timestamp::new(about.data.created_utc as u64),
            suspended: about.data.is_suspended,
        })
    }

    fn list_comments(
        &self,
        handle: &AccountHandle,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError> {
        let mut comments = Vec::new();
        let mut after: Option<String> = None;

        while comments.len() < limit {
            let page_size = PAGE_SIZE.min(limit - comments.len()).to_string();
            let mut query = vec![("limit", page_size.as_str()), ("raw_json", "1")];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let listing: wire::Listing<wire::CommentData> =
                self.get_json(&format!("/user/{handle}/comments"), &query)?;
            if listing.data.children.is_empty() {
                break;
            }
            for child in listing.data.children {
                comments.push(Comment {
                    community: CommunityId::new(child.data.subreddit),
                    created: Timestamp::new(child.data.created_utc as u64),
                    score: child.data.score,
                });
            }
            match listing.data.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        comments.truncate(limit);
        Ok(comments)
    }

    fn list_mod_notes(
        &self,
        handle: &AccountHandle,
        community: &CommunityId,
    ) -> Result<Vec<ModNote>, PlatformError> {
        let mut notes = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let mut query = vec![
                ("subreddit", community.as_str()),
                ("user", handle.as_str()),
                ("limit", "100"),
            ];
            if let Some(cursor) = before.as_deref() {
                query.push(("before", cursor));
            }
            let page: wire::ModNotesResponse = self.get_json("/api/mod/notes", &query)?;
            for note in page.mod_notes {
                notes.push(ModNote::new(note.kind));
            }
            if !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(cursor) => before = Some(cursor),
                None => break,
            }
        }
        Ok(notes)
    }
}

impl ReportSink for RedditClient {
    fn grant_contributor(&self, handle: &AccountHandle) -> Result<(), PlatformError> {
        let body = self.post_form(
            &format!("/r/{}/api/friend", self.community),
            &[
                ("name", handle.as_str()),
                ("type", "contributor"),
                ("api_type", "json"),
            ],
        )?;
        if body.contains("RATELIMIT") {
            return Err(PlatformError::RateLimited(format!(
                "contributor grant for {handle} throttled"
            )));
        }
        Ok(())
    }

    fn post_verified_report(
        &self,
        handle: &AccountHandle,
        report: &str,
    ) -> Result<(), PlatformError> {
        // The verification request arrives as a single-message modmail
        // conversation authored by the account and the bot; the report goes
        // there as an internal note.
        let response: wire::ConversationsResponse = self.get_json(
            "/api/mod/conversations",
            &[
                ("entity", self.community.as_str()),
                ("state", "all"),
                ("limit", "100"),
            ],
        )?;
        let target = response.conversations.iter().find(|(_, conversation)| {
            conversation.num_messages == 1
                && conversation
                    .authors
                    .iter()
                    .any(|a| a.name.eq_ignore_ascii_case(handle.as_str()))
                && conversation
                    .authors
                    .iter()
                    .any(|a| a.name.eq_ignore_ascii_case(self.bot_handle.as_str()))
        });

        match target {
            Some((id, _)) => {
                self.post_form(
                    &format!("/api/mod/conversations/{id}"),
                    &[("body", report), ("isInternal", "true")],
                )?;
                Ok(())
            }
            None => {
                tracing::warn!("no modmail conversation found for {handle}; report not posted");
                Ok(())
            }
        }
    }

    fn post_failed_report(&self, report: &str) -> Result<(), PlatformError> {
        self.post_form(
            &format!(
                "/api/mod/conversations/{}",
                self.failed_report_conversation
            ),
            &[("body", report)],
        )?;
        Ok(())
    }

    fn list_contributors(&self) -> Result<Vec<AccountHandle>, PlatformError> {
        let list: wire::UserList = self.get_json(
            &format!("/r/{}/about/contributors", self.community),
            &[("limit", "100")],
        )?;
        Ok(list
            .data
            .children
            .into_iter()
            .map(|entry| AccountHandle::new(entry.name))
            .collect())
    }
}

impl Mailbox for RedditClient {
    fn unread(&self) -> Result<Vec<InboxMessage>, PlatformError> {
        let listing: wire::Listing<wire::MessageData> =
            self.get_json("/message/unread", &[("limit", "100")])?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| InboxMessage {
                id: child.data.name,
                author: AccountHandle::new(child.data.author.unwrap_or_default()),
                subject: child.data.subject,
                body: child.data.body,
                was_comment: child.data.was_comment,
            })
            .collect())
    }

    fn mark_read(&self, id: &str) -> Result<(), PlatformError> {
        self.post_form("/api/read_message", &[("id", id)])?;
        Ok(())
    }

    fn reply(&self, id: &str, body: &str) -> Result<(), PlatformError> {
        self.post_form("/api/comment", &[("thing_id", id), ("text", body)])?;
        Ok(())
    }

    fn list_moderators(&self) -> Result<Vec<AccountHandle>, PlatformError> {
        let list: wire::UserList = self.get_json(
            &format!("/r/{}/about/moderators", self.community),
            &[],
        )?;
        Ok(list
            .data
            .children
            .into_iter()
            .map(|entry| AccountHandle::new(entry.name))
            .collect())
    }

    fn send_message(
        &self,
        to: &AccountHandle,
        subject: &str,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.post_form(
            "/api/compose",
            &[("to", to.as_str()), ("subject", subject), ("text", body)],
        )?;
        Ok(())
    }
}
