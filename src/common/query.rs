// src/common/query.rs
//! Pagination, search and status filters encoded as query parameters.
//! Default values are left out of the URL.

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const MANAGED_KEYS: [&str; 4] = ["page", "limit", "search", "status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            status: None,
        }
    }
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(search.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = non_blank(status.into());
        self
    }

    /// Non-default parameters only, in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.page != DEFAULT_PAGE {
            pairs.push(("page", self.page.to_string()));
        }
        if self.limit != DEFAULT_LIMIT {
            pairs.push(("limit", self.limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }

    /// `page=2&search=rust%20dev`; empty when everything is default
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the query string to an API path
    pub fn append_to_path(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            path.to_string()
        } else if path.contains('?') {
            format!("{}&{}", path, query)
        } else {
            format!("{}?{}", path, query)
        }
    }

    /// Reads the filter back from a location; bad numbers fall back to defaults
    pub fn from_url(url: &Url) -> Self {
        let mut query = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page" => {
                    if let Ok(page) = value.parse::<u32>() {
                        query.page = page.max(1);
                    }
                }
                "limit" => {
                    if let Ok(limit) = value.parse::<u32>() {
                        query.limit = limit.max(1);
                    }
                }
                "search" => query.search = non_blank(value.into_owned()),
                "status" => query.status = non_blank(value.into_owned()),
                _ => {}
            }
        }
        query
    }

    /// Writes the filter into a location, keeping unrelated parameters intact
    pub fn apply_to_url(&self, url: &Url) -> Url {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !MANAGED_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut next = url.clone();
        next.set_query(None);
        let pairs = self.to_pairs();
        if !kept.is_empty() || !pairs.is_empty() {
            let mut serializer = next.query_pairs_mut();
            for (k, v) in &kept {
                serializer.append_pair(k, v);
            }
            for (k, v) in &pairs {
                serializer.append_pair(k, v);
            }
        }
        next
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default, alias = "pages")]
    total_pages: Option<u32>,
}

// List endpoints answer with a bare array or a keyed page object
#[derive(Deserialize)]
#[serde(untagged)]
enum PageWire<T> {
    Plain(Vec<T>),
    Paged {
        #[serde(
            alias = "transactions",
            alias = "requests",
            alias = "candidates",
            alias = "docs",
            alias = "results"
        )]
        items: Vec<T>,
        #[serde(flatten)]
        meta: PageMeta,
        #[serde(default)]
        pagination: Option<PageMeta>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Paginated<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match PageWire::<T>::deserialize(deserializer)? {
            PageWire::Plain(items) => {
                let total = items.len() as u64;
                let limit = (items.len() as u32).max(1);
                Ok(Paginated {
                    items,
                    total,
                    page: DEFAULT_PAGE,
                    limit,
                    total_pages: 1,
                })
            }
            PageWire::Paged {
                items,
                meta,
                pagination,
            } => {
                let meta = pagination.unwrap_or(meta);
                let total = meta.total.unwrap_or(items.len() as u64);
                let limit = meta.limit.unwrap_or(DEFAULT_LIMIT).max(1);
                let total_pages = meta
                    .total_pages
                    .unwrap_or_else(|| total.div_ceil(limit as u64).max(1) as u32);
                Ok(Paginated {
                    items,
                    total,
                    page: meta.page.unwrap_or(DEFAULT_PAGE),
                    limit,
                    total_pages,
                })
            }
        }
    }
}
