//! Domain layer of the KubeXY pod viewer.
//!
//! Holds everything that does not need an HTTP server: the SVG board
//! document and its circle creator, the pod model and its concurrent store,
//! the demo cluster simulator, the name anonymizer and the mapping from
//! Kubernetes pod objects.

pub mod board;
pub mod demo;
pub mod error;
pub mod kube;
pub mod naming;
pub mod pod;
pub mod pod_store;
pub mod svg;
