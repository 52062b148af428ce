//! Datagrid Provider
//!
//! A server-side items provider for paginated data grids. Translates the
//! grid's paging/sort/filter context into a DataTables-compatible server
//! query, dispatches it over an injected HTTP client (as a GET query
//! string or a POST body), and tracks paging counters from the response.

pub mod codec;
pub mod constants;
pub mod domain;
pub mod error;
pub mod provider;

pub use domain::{
    ColumnSpec, FetchContext, FieldDef, Fields, Filter, OrderDir, OrderSpec, QueryResponse,
    SearchSpec, ServerQuery,
};
pub use error::{Error, Result};
pub use provider::{
    HttpClient, ItemsProvider, Method, PageLength, ProviderConfig, ReqwestClient,
};
