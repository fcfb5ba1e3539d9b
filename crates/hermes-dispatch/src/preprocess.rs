//! Request preprocessors.
//!
//! Preprocessors are guards that run after the body has been decoded and
//! before any parameter is extracted. There are two chains: one over the
//! decoded [`JsonObject`](hermes_extract::JsonObject) and one over the
//! [`InboundRequest`](hermes_extract::InboundRequest). The JSON chain runs
//! to completion before the request chain starts.
//!
//! A stage either lets the request through or halts it with the complete
//! response to send. The first stage that halts ends the pipeline; no later
//! stage, extractor or handler runs.
//!
//! # Example
//!
//! ```rust
//! use hermes_dispatch::{Preprocessed, PreprocessorChain, Response, ResponseExt};
//! use hermes_extract::InboundRequest;
//! use http::{HeaderMap, StatusCode};
//!
//! let mut chain = PreprocessorChain::<InboundRequest>::new("request");
//! chain.push(|headers: &HeaderMap, _request: &InboundRequest| {
//!     if headers.contains_key("authorization") {
//!         Preprocessed::Continue
//!     } else {
//!         Preprocessed::Halt(Response::text(StatusCode::UNAUTHORIZED, "missing token"))
//!     }
//! });
//! assert_eq!(chain.len(), 1);
//! ```

use crate::types::Response;
use http::HeaderMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of a preprocessor stage.
#[derive(Debug)]
pub enum Preprocessed {
    /// Let the request through to the next stage.
    Continue,
    /// Stop here and send this response.
    Halt(Response),
}

impl Preprocessed {
    /// Returns `true` if this outcome halts the pipeline.
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

/// A guard over the request headers and a subject of type `T`.
///
/// Closures of the form `Fn(&HeaderMap, &T) -> Preprocessed` implement this
/// trait.
pub trait RequestPreprocessor<T>: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Inspects the request and decides whether it may continue.
    fn preprocess(&self, headers: &HeaderMap, subject: &T) -> Preprocessed;
}

impl<T, F> RequestPreprocessor<T> for F
where
    F: Fn(&HeaderMap, &T) -> Preprocessed + Send + Sync + 'static,
{
    fn preprocess(&self, headers: &HeaderMap, subject: &T) -> Preprocessed {
        self(headers, subject)
    }
}

/// A type-erased preprocessor that can be stored in a chain.
pub type BoxedPreprocessor<T> = Arc<dyn RequestPreprocessor<T>>;

/// An ordered list of preprocessors over the same subject.
pub struct PreprocessorChain<T> {
    name: &'static str,
    stages: Vec<BoxedPreprocessor<T>>,
}

impl<T: 'static> PreprocessorChain<T> {
    /// Creates an empty chain. The name appears in logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
        }
    }

    /// Appends a stage to the end of the chain.
    pub fn push<P>(&mut self, preprocessor: P)
    where
        P: RequestPreprocessor<T>,
    {
        self.stages.push(Arc::new(preprocessor));
    }

    /// Appends an already boxed stage.
    pub fn push_boxed(&mut self, preprocessor: BoxedPreprocessor<T>) {
        self.stages.push(preprocessor);
    }

    /// Returns the chain name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs the stages in order, stopping at the first halt.
    pub fn run(&self, headers: &HeaderMap, subject: &T) -> Preprocessed {
        for (index, stage) in self.stages.iter().enumerate() {
            if let Preprocessed::Halt(response) = stage.preprocess(headers, subject) {
                tracing::debug!(
                    chain = self.name,
                    stage = index,
                    preprocessor = stage.name(),
                    status = response.status().as_u16(),
                    "preprocessor halted request"
                );
                return Preprocessed::Halt(response);
            }
        }
        Preprocessed::Continue
    }
}

impl<T> Clone for PreprocessorChain<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            stages: self.stages.clone(),
        }
    }
}

impl<T> fmt::Debug for PreprocessorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessorChain")
            .field("name", &self.name)
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        halt: bool,
    }

    impl RequestPreprocessor<u32> for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn preprocess(&self, _headers: &HeaderMap, _subject: &u32) -> Preprocessed {
            self.log.lock().unwrap().push(self.label);
            if self.halt {
                Preprocessed::Halt(Response::text(StatusCode::FORBIDDEN, self.label))
            } else {
                Preprocessed::Continue
            }
        }
    }

    fn chain(halts: &[bool], log: &Arc<Mutex<Vec<&'static str>>>) -> PreprocessorChain<u32> {
        const LABELS: [&str; 4] = ["first", "second", "third", "fourth"];
        let mut chain = PreprocessorChain::new("test");
        for (label, halt) in LABELS.iter().zip(halts) {
            chain.push(Recorder {
                label: *label,
                log: Arc::clone(log),
                halt: *halt,
            });
        }
        chain
    }

    #[test]
    fn test_empty_chain_continues() {
        let chain = PreprocessorChain::<u32>::new("empty");
        assert!(chain.is_empty());
        assert!(!chain.run(&HeaderMap::new(), &0).is_halt());
    }

    #[test]
    fn test_all_stages_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(&[false, false, false], &log);

        assert!(!chain.run(&HeaderMap::new(), &0).is_halt());
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn test_first_halt_stops_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(&[false, true, true, false], &log);

        match chain.run(&HeaderMap::new(), &0) {
            Preprocessed::Halt(response) => assert_eq!(response.status(), StatusCode::FORBIDDEN),
            Preprocessed::Continue => panic!("expected halt"),
        }
        assert_eq!(*log.lock().unwrap(), ["first", "second"]);
    }

    #[test]
    fn test_closure_preprocessor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut chain = PreprocessorChain::<u32>::new("closures");
        chain.push(move |headers: &HeaderMap, subject: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            if headers.contains_key("x-block") || *subject > 10 {
                Preprocessed::Halt(Response::text(StatusCode::BAD_REQUEST, "blocked"))
            } else {
                Preprocessed::Continue
            }
        });

        assert!(!chain.run(&HeaderMap::new(), &1).is_halt());
        assert!(chain.run(&HeaderMap::new(), &11).is_halt());

        let mut headers = HeaderMap::new();
        headers.insert("x-block", "1".parse().unwrap());
        assert!(chain.run(&headers, &1).is_halt());

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stage_names() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(&[false, false], &log);
        assert_eq!(chain.stage_names(), ["first", "second"]);
        assert_eq!(chain.name(), "test");
    }
}
