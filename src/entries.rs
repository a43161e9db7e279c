//! Typed views over database query results.
//!
//! The raw query payload stays verbatim for the pass-through endpoint;
//! this module parses it into [`Entry`] records and derives the three
//! user-facing projections: all entries, snippet-tagged entries for a
//! date, and the same enriched with rendered document content.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{self, AREA_PROPERTY, DATE_PROPERTY, TITLE_PROPERTY, WHO_PROPERTY};
use crate::error::RelayError;
use crate::walker::TreeWalker;

/// A single rich-text fragment of a title or rich_text property.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFragment {
    #[serde(default)]
    pub text: Option<TitleText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleText {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: String,
}

/// One property of an entry. Only the payload matching `type` is
/// populated; the rest deserialize to `None`/empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyValue {
    #[serde(rename = "type", default)]
    pub property_type: String,
    #[serde(default)]
    pub title: Option<Vec<TitleFragment>>,
    #[serde(default)]
    pub rich_text: Option<Vec<TitleFragment>>,
    #[serde(default)]
    pub multi_select: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub relation: Option<Vec<RelationRef>>,
    #[serde(default)]
    pub date: Option<DateValue>,
}

impl PropertyValue {
    /// Text fragments of a typed title property, following the
    /// property's own `type` discriminator.
    fn title_fragments(&self) -> &[TitleFragment] {
        let fragments = match self.property_type.as_str() {
            "title" => self.title.as_deref(),
            "rich_text" => self.rich_text.as_deref(),
            _ => None,
        };
        fragments.unwrap_or(&[])
    }

    fn texts(&self) -> Vec<String> {
        self.title_fragments()
            .iter()
            .filter_map(|f| f.text.as_ref())
            .map(|t| t.content.clone())
            .collect()
    }
}

/// A row of the document database.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Entry>,
}

impl Entry {
    fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    fn title_texts(&self) -> Vec<String> {
        self.property(TITLE_PROPERTY)
            .map(|p| p.texts())
            .unwrap_or_default()
    }

    fn collaborator_names(&self) -> Vec<String> {
        self.property(WHO_PROPERTY)
            .and_then(|p| p.multi_select.as_ref())
            .map(|opts| opts.iter().map(|o| o.name.clone()).collect())
            .unwrap_or_default()
    }

    fn relation_ids(&self) -> Vec<String> {
        self.property(AREA_PROPERTY)
            .and_then(|p| p.relation.as_ref())
            .map(|rels| rels.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    fn date_start(&self) -> Option<&str> {
        self.property(DATE_PROPERTY)
            .and_then(|p| p.date.as_ref())
            .map(|d| d.start.as_str())
    }
}

/// Parses the verbatim query payload into typed entries.
pub fn parse_entries(raw: Value) -> Result<Vec<Entry>, RelayError> {
    let response: QueryResponse = serde_json::from_value(raw)
        .map_err(|e| RelayError::MalformedUpstream(format!("database query result: {e}")))?;
    Ok(response.results)
}

/// The all-entries view: id, title texts and collaborator names.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub id: String,
    pub name: Vec<String>,
    pub who: Vec<String>,
}

pub fn page_summaries(entries: &[Entry]) -> Vec<PageSummary> {
    entries
        .iter()
        .map(|entry| PageSummary {
            id: entry.id.clone(),
            name: entry.title_texts(),
            who: entry.collaborator_names(),
        })
        .collect()
}

/// A snippet-tagged entry for a specific date, with owner emails and,
/// when enriched, the rendered document content.
#[derive(Debug, Clone, Serialize)]
pub struct TaggedEntry {
    pub id: String,
    pub name: Vec<String>,
    pub relations: Vec<String>,
    pub who: Vec<String>,
    pub who_email: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
}

/// Keeps entries tagged with the snippet relation whose date start equals
/// `date` (exact string match), attaching collaborator emails from the
/// static table. A name missing from the table is an error, not a skip.
pub fn tagged_for_date(entries: &[Entry], date: &str) -> Result<Vec<TaggedEntry>, RelayError> {
    let mut result = Vec::new();

    for entry in entries {
        let relations = entry.relation_ids();
        if !relations.iter().any(|id| id == config::SNIPPET_RELATION_ID) {
            continue;
        }
        if entry.date_start() != Some(date) {
            continue;
        }

        let who = entry.collaborator_names();
        let who_email = who
            .iter()
            .map(|name| {
                config::email_for(name)
                    .map(str::to_string)
                    .ok_or_else(|| RelayError::UnknownCollaborator(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        result.push(TaggedEntry {
            id: entry.id.clone(),
            name: entry.title_texts(),
            relations,
            who,
            who_email,
            content: None,
        });
    }

    Ok(result)
}

/// The tagged-for-date view with each entry's document rendered to
/// Markdown lines via the tree walker.
pub async fn tagged_for_date_with_content(
    entries: &[Entry],
    date: &str,
    walker: &TreeWalker,
) -> Result<Vec<TaggedEntry>, RelayError> {
    let mut tagged = tagged_for_date(entries, date)?;
    for entry in &mut tagged {
        entry.content = Some(walker.walk(&entry.id).await?);
    }
    Ok(tagged)
}
