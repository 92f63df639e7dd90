//! MCP tools for GitHub Projects (v2): list an organization's projects, add
//! an issue to a project, and set a project item's single-select field.
//!
//! Every tool funnels through [`http::GraphQlExecutor`], which posts one
//! GraphQL document per call and decodes the `{data, errors}` envelope.

pub mod auth;
pub mod config;
pub mod context;
pub mod github;
pub mod http;
pub mod mcp;
pub mod params;
pub mod projects;
pub mod server;
pub mod tools;
pub mod types;
