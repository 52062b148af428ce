//! Items Provider
//!
//! The data-provider adapter a grid calls once per page/sort/filter
//! change. Translates the grid context into a DataTables-style server
//! query, dispatches it over the injected transport (or serves
//! pre-loaded local rows), and tracks paging counters from the response.
//!
//! Not designed for overlapping invocations: a new call overwrites the
//! busy flag, query snapshot and counters unconditionally.

use serde_json::{Map, Value};

use crate::codec;
use crate::constants::{DEFAULT_PAGE_LENGTHS, DEFAULT_PER_PAGE, DRAW, PROVIDER_NAME};
use crate::domain::{
    ColumnSpec, FetchContext, FieldDef, Fields, Filter, OrderDir, OrderSpec, QueryResponse,
    SearchSpec, ServerQuery,
};
use crate::error::Error;
use crate::provider::http::HttpClient;

/// HTTP dispatch method for remote queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// One page-size choice offered to the grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLength {
    /// Rows per page; `-1` means all rows
    pub value: i64,
    pub label: String,
}

fn default_page_lengths() -> Vec<PageLength> {
    DEFAULT_PAGE_LENGTHS
        .iter()
        .map(|(value, label)| PageLength {
            value: *value,
            label: (*label).to_string(),
        })
        .collect()
}

/// Recognized provider options
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub per_page: i64,
    pub current_page: u64,
    pub filter: Option<Filter>,
    /// Field keys excluded from the global search
    pub filter_ignored_fields: Vec<String>,
    /// Field keys forced into the global search; wins over the ignored list
    pub filter_included_fields: Vec<String>,
    pub method: Method,
    pub api_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            current_page: 1,
            filter: None,
            filter_ignored_fields: Vec::new(),
            filter_included_fields: Vec::new(),
            method: Method::Get,
            api_url: String::new(),
        }
    }
}

/// Mutating hook invoked on the query before dispatch
pub type BeforeQueryHook = Box<dyn FnMut(&mut ServerQuery, &FetchContext) + Send>;
/// Hook invoked per field while building column entries
pub type FieldTranslateHook = Box<dyn FnMut(&FieldDef, &mut ColumnSpec) + Send>;
/// Hook invoked with the raw response body after a successful fetch
pub type ResponseCompleteHook = Box<dyn FnMut(&Value) + Send>;
/// Hook invoked with the error after a failed fetch
pub type ResponseErrorHook = Box<dyn FnMut(&Error) + Send>;

/// Server-side items provider for one grid instance
pub struct ItemsProvider<C: HttpClient> {
    client: C,
    fields: Vec<FieldDef>,

    pub per_page: i64,
    /// 1-based page most recently requested
    pub current_page: u64,
    pub filter: Option<Filter>,
    pub filter_ignored_fields: Vec<String>,
    pub filter_included_fields: Vec<String>,
    /// True while a remote fetch is in flight
    pub busy: bool,
    pub total_rows: u64,
    /// 1-based first row of the loaded page; 0 while no page is loaded
    pub start_row: u64,
    /// 1-based last row of the loaded page; 0 while no page is loaded
    pub end_row: u64,
    pub api_url: String,
    pub method: Method,
    /// Page-size choices offered to the grid
    pub page_lengths: Vec<PageLength>,

    ajax_url: String,
    last_query: Option<ServerQuery>,
    local_items: Option<Vec<Value>>,

    on_before_query: Option<BeforeQueryHook>,
    on_field_translate: Option<FieldTranslateHook>,
    on_response_complete: Option<ResponseCompleteHook>,
    on_response_error: Option<ResponseErrorHook>,
}

impl<C: HttpClient> ItemsProvider<C> {
    /// Create a provider with default options
    pub fn new(client: C, fields: Fields) -> Self {
        Self::with_config(client, fields, ProviderConfig::default())
    }

    /// Create a provider with explicit options
    pub fn with_config(client: C, fields: Fields, config: ProviderConfig) -> Self {
        Self {
            client,
            fields: fields.normalize(),
            per_page: config.per_page,
            current_page: config.current_page,
            filter: config.filter,
            filter_ignored_fields: config.filter_ignored_fields,
            filter_included_fields: config.filter_included_fields,
            busy: false,
            total_rows: 0,
            start_row: 0,
            end_row: 0,
            api_url: config.api_url,
            method: config.method,
            page_lengths: default_page_lengths(),
            ajax_url: String::new(),
            last_query: None,
            local_items: None,
            on_before_query: None,
            on_field_translate: None,
            on_response_complete: None,
            on_response_error: None,
        }
    }

    // ==================== Hooks ====================

    /// Mutate the query in place before every dispatch
    pub fn on_before_query(
        mut self,
        hook: impl FnMut(&mut ServerQuery, &FetchContext) + Send + 'static,
    ) -> Self {
        self.on_before_query = Some(Box::new(hook));
        self
    }

    /// Adjust each column entry while the query is translated
    pub fn on_field_translate(
        mut self,
        hook: impl FnMut(&FieldDef, &mut ColumnSpec) + Send + 'static,
    ) -> Self {
        self.on_field_translate = Some(Box::new(hook));
        self
    }

    /// Observe the raw response body after a successful fetch
    pub fn on_response_complete(mut self, hook: impl FnMut(&Value) + Send + 'static) -> Self {
        self.on_response_complete = Some(Box::new(hook));
        self
    }

    /// Observe transport failures; fetches still resolve to an empty page
    pub fn on_response_error(mut self, hook: impl FnMut(&Error) + Send + 'static) -> Self {
        self.on_response_error = Some(Box::new(hook));
        self
    }

    // ==================== Accessors ====================

    /// Component name
    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// Canonical field list driving column translation
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Last computed server query
    pub fn server_params(&self) -> Option<&ServerQuery> {
        self.last_query.as_ref()
    }

    /// Last dispatch URL without its query string
    pub fn ajax_url(&self) -> &str {
        &self.ajax_url
    }

    /// Injected transport
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Pre-loaded rows that bypass remote fetching
    pub fn local_items(&self) -> Option<&[Value]> {
        self.local_items.as_deref()
    }

    /// Serve these rows instead of fetching until cleared
    pub fn set_local_items(&mut self, items: Vec<Value>) {
        self.local_items = Some(items);
    }

    pub fn clear_local_items(&mut self) {
        self.local_items = None;
    }

    fn reset_counters(&mut self) {
        self.start_row = 0;
        self.end_row = 0;
    }

    // ==================== Translation ====================

    /// Translate the grid context plus an optional base query into the
    /// structured server query.
    ///
    /// The base query is applied over the skeleton first (see
    /// [`ServerQuery::apply_overlay`] for the precedence rules), then the
    /// canonical field list is walked in order: each non-excluded field
    /// contributes a column entry and advances the positional index the
    /// sort instruction refers to. Local fields with an empty key carry
    /// no server-side column.
    pub fn translate_context(
        &mut self,
        ctx: &FetchContext,
        base: Map<String, Value>,
    ) -> ServerQuery {
        let (value, regex) = match &ctx.filter {
            Some(filter) => (filter.value().to_string(), filter.is_regex()),
            None => (String::new(), false),
        };

        let mut query = ServerQuery {
            draw: DRAW,
            start: (ctx.current_page as i64 - 1) * ctx.per_page,
            length: ctx.per_page,
            search: SearchSpec { value, regex },
            order: Vec::new(),
            columns: Vec::new(),
            extra: Map::new(),
        };
        query.apply_overlay(base);

        let mut index = 0;
        for field in &self.fields {
            let key = field.key_str();
            let mut col = ColumnSpec {
                data: key.to_string(),
                name: key.to_string(),
                searchable: true,
                orderable: field.sortable.unwrap_or(true),
            };

            if self.filter_ignored_fields.iter().any(|ignored| ignored == key) {
                col.searchable = false;
            }
            // the included list wins when a key is in both
            if self.filter_included_fields.iter().any(|included| included == key) {
                col.searchable = true;
            }

            if let Some(hook) = self.on_field_translate.as_mut() {
                hook(field, &mut col);
            }

            if ctx.sort_by.as_deref() == Some(key) && col.orderable {
                query.order.push(OrderSpec {
                    column: index,
                    dir: if ctx.sort_desc { OrderDir::Desc } else { OrderDir::Asc },
                });
            }

            if !(field.is_local && key.is_empty()) {
                query.columns.push(col);
                index += 1;
            }
        }

        query
    }

    // ==================== Fetching ====================

    /// Run one fetch for the given grid context.
    ///
    /// Serves local items when set, otherwise dispatches the translated
    /// query over the injected transport. Transport failures degrade to
    /// an empty page and `total_rows` keeps its previous value, so the
    /// grid never sees an error and page counts don't flicker.
    pub async fn execute_query(&mut self, ctx: &FetchContext) -> Vec<Value> {
        let api_url = ctx.api_url.clone().unwrap_or_else(|| self.api_url.clone());
        let (base_url, base_query) = match api_url.split_once('?') {
            Some((base, existing)) => (base.to_string(), codec::parse(existing)),
            None => (api_url, Map::new()),
        };

        let mut query = self.translate_context(ctx, base_query);

        if let Some(hook) = self.on_before_query.as_mut() {
            hook(&mut query, ctx);
        }

        self.ajax_url = base_url;
        self.last_query = Some(query.clone());

        if let Some(items) = &self.local_items {
            let rows = items.clone();
            self.current_page = 1;
            self.total_rows = rows.len() as u64;
            self.start_row = 1;
            self.end_row = self.total_rows;
            self.per_page = rows.len() as i64;
            return rows;
        }

        self.reset_counters();
        self.busy = true;

        tracing::debug!(
            url = %self.ajax_url,
            method = ?self.method,
            start = query.start,
            length = query.length,
            "dispatching query"
        );

        let result = match self.method {
            Method::Post => {
                let body = serde_json::to_value(&query).unwrap_or(Value::Null);
                self.client.post(&self.ajax_url, &body).await
            }
            Method::Get => {
                let url = format!("{}?{}", self.ajax_url, query.to_query_string());
                self.client.get(&url).await
            }
        };

        match result {
            Ok(body) => self.complete_response(&query, body),
            Err(error) => {
                self.busy = false;
                tracing::warn!(%error, "query failed, returning empty page");
                if let Some(hook) = self.on_response_error.as_mut() {
                    hook(&error);
                }
                Vec::new()
            }
        }
    }

    fn complete_response(&mut self, query: &ServerQuery, body: Value) -> Vec<Value> {
        let parsed: QueryResponse = serde_json::from_value(body.clone()).unwrap_or_default();

        self.total_rows = parsed.records_filtered.unwrap_or(parsed.records_total);
        self.start_row = (query.start + 1).max(0) as u64;

        let end_row = query.start + query.length;
        self.end_row = if end_row > self.total_rows as i64 || end_row < 0 {
            self.total_rows
        } else {
            end_row as u64
        };

        if let Some(hook) = self.on_response_complete.as_mut() {
            hook(&body);
        }

        self.busy = false;
        parsed.data
    }
}

impl<C: HttpClient + std::fmt::Debug> std::fmt::Debug for ItemsProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemsProvider")
            .field("client", &self.client)
            .field("fields", &self.fields.len())
            .field("per_page", &self.per_page)
            .field("current_page", &self.current_page)
            .field("busy", &self.busy)
            .field("total_rows", &self.total_rows)
            .field("api_url", &self.api_url)
            .finish()
    }
}
