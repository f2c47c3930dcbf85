//! WSDL from source - Automatic WSDL service descriptions from Rust code.
//!
//! This library reflects callable operations (the public methods of a type, or
//! free functions) into abstract signatures and builds a WSDL 1.1 document that
//! describes them as SOAP operations: schema types, messages, a port type, a
//! SOAP binding and a service entry.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`reflection`] - Turns Rust source or JSON/YAML manifests into operation signatures
//! 3. [`type_resolver`] - Maps type names to schema references through a pluggable strategy
//! 4. [`strategy`] - Complex type strategies, including nested `ArrayOf...` sequences
//! 5. [`wsdl`] - WSDL document primitives on top of the [`xml`] tree
//! 6. [`discovery`] - Drives document construction for a class or a set of functions
//! 7. [`serializer`] - Renders, writes and serves the finished document
//!
//! [`config`] and [`environment`] supply the settings and the request context
//! used to default the endpoint URI.
//!
//! # Example Usage
//!
//! ```no_run
//! use wsdl_from_source::{
//!     config::{BindingStyleUpdate, Style},
//!     discovery::AutoDiscover,
//!     reflection::source::SourceReflector,
//!     strategy::ArrayOfTypeSequence,
//! };
//! use std::path::Path;
//!
//! let reflector = SourceReflector::from_directory(Path::new("./my-service")).unwrap();
//!
//! let mut discover = AutoDiscover::new();
//! discover.set_uri("http://localhost/soap/customers").unwrap();
//! discover.set_complex_type_strategy(Box::new(ArrayOfTypeSequence));
//! discover
//!     .set_binding_style(&BindingStyleUpdate {
//!         style: Some(Style::Document),
//!         transport: None,
//!     })
//!     .unwrap();
//! discover.set_class(&reflector, "CustomerService").unwrap();
//!
//! println!("{}", discover.to_xml().unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod reflection;
pub mod scanner;
pub mod serializer;
pub mod strategy;
pub mod type_resolver;
pub mod wsdl;
pub mod xml;
