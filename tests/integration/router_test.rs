//! Router Integration Tests
//!
//! Handlers implemented as plain structs, covering single phases, chains,
//! circular providers, outcome checking and concurrent consumers.

use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;

use phase_router::{
    FnPhase, OutcomeStore, OutcomeType, PhaseContext, PhaseError, PhaseHandler, PhaseRegistration,
    PhaseResult, PhaseRouterBuilder,
};

/// Outcome carrying a piece of text.
trait Text: Send + Sync + 'static {
    fn from_text(text: String) -> Self;
    fn text(&self) -> &str;
}

macro_rules! text_outcome {
    ($($name:ident),*) => {
        $(
            #[derive(Debug, Clone, PartialEq)]
            struct $name(String);

            impl Text for $name {
                fn from_text(text: String) -> Self {
                    Self(text)
                }

                fn text(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

text_outcome!(TestResult, Input1, OtherOutcome, Type1, Type2, Type3);

// ============================================================================
// Handlers
// ============================================================================

/// Provides `Out` with fixed text and no inputs.
struct Source<Out> {
    text: &'static str,
    _out: PhantomData<fn() -> Out>,
}

fn source<Out>(text: &'static str) -> Source<Out> {
    Source {
        text,
        _out: PhantomData,
    }
}

impl<Out: Text> PhaseHandler for Source<Out> {
    fn declare(&self, registration: &mut PhaseRegistration) -> PhaseResult<()> {
        registration.provides::<Out>();
        Ok(())
    }

    fn process(&self, ctx: &mut PhaseContext<'_>) -> PhaseResult<()> {
        ctx.provide(Out::from_text(self.text.to_string()))
    }
}

/// Copies the text of `In` into `Out`, optionally wrapped in brackets.
struct Relay<In, Out> {
    bracket: bool,
    _types: PhantomData<fn(In) -> Out>,
}

fn relay<In, Out>() -> Relay<In, Out> {
    Relay {
        bracket: false,
        _types: PhantomData,
    }
}

fn wrap<In, Out>() -> Relay<In, Out> {
    Relay {
        bracket: true,
        _types: PhantomData,
    }
}

impl<In: Text, Out: Text> PhaseHandler for Relay<In, Out> {
    fn declare(&self, registration: &mut PhaseRegistration) -> PhaseResult<()> {
        registration.consumes::<In>().provides::<Out>();
        Ok(())
    }

    fn process(&self, ctx: &mut PhaseContext<'_>) -> PhaseResult<()> {
        let text = ctx.consume::<In>()?.text();
        let text = if self.bracket {
            format!("[{text}]")
        } else {
            text.to_string()
        };
        ctx.provide(Out::from_text(text))
    }
}

/// Declares two outcomes but only provides the first.
struct BrokenPromise;

impl PhaseHandler for BrokenPromise {
    fn name(&self) -> &str {
        "broken-promise"
    }

    fn declare(&self, registration: &mut PhaseRegistration) -> PhaseResult<()> {
        registration
            .provides::<TestResult>()
            .provides::<OtherOutcome>();
        Ok(())
    }

    fn process(&self, ctx: &mut PhaseContext<'_>) -> PhaseResult<()> {
        ctx.provide(TestResult("success".into()))
    }
}

// ============================================================================
// Single phases
// ============================================================================

#[test]
fn test_single_handler_without_input() {
    let router = PhaseRouterBuilder::new()
        .add_phase(source::<TestResult>("result"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(router.consume::<TestResult>().unwrap(), TestResult("result".into()));
}

#[test]
fn test_single_handler_with_input() {
    let mut router = PhaseRouterBuilder::new()
        .add_phase(relay::<Input1, TestResult>())
        .unwrap()
        .build()
        .unwrap();
    router.provide(Input1("input1".into())).unwrap();
    assert_eq!(router.consume::<TestResult>().unwrap(), TestResult("input1".into()));
}

#[test]
fn test_single_handler_missing_input() {
    let router = PhaseRouterBuilder::new()
        .add_phase(relay::<Input1, TestResult>())
        .unwrap()
        .build()
        .unwrap();
    let err = router.consume::<TestResult>().unwrap_err();
    assert!(matches!(err, PhaseError::UnresolvableChain(_)));
    assert_eq!(err.outcome_type(), Some(OutcomeType::of::<TestResult>()));
}

// ============================================================================
// Chains
// ============================================================================

#[test]
fn test_simple_handler_chain() {
    let mut router = PhaseRouterBuilder::new()
        .add_phase(wrap::<Type2, Type1>())
        .and_then(|b| b.add_phase(wrap::<Type3, Type2>()))
        .and_then(|b| b.add_phase(wrap::<Input1, Type3>()))
        .and_then(|b| b.build())
        .unwrap();

    let value: Type1 = router
        .consume_with(OutcomeStore::new().with(Input1("in".into())).unwrap())
        .unwrap();
    assert_eq!(value, Type1("[[[in]]]".into()));

    let chain = router.resolve_chain::<Type1>().unwrap();
    assert_eq!(chain.ids(), vec![3, 2, 1]);
}

#[test]
fn test_circular_providers() {
    let router = PhaseRouterBuilder::new()
        .add_phase(relay::<Type2, Type1>())
        .and_then(|b| b.add_phase(relay::<Type1, Type2>()))
        .and_then(|b| b.build())
        .unwrap();

    let err = router.consume::<Type1>().unwrap_err();
    assert!(matches!(err, PhaseError::UnresolvableChain(t) if t == OutcomeType::of::<Type1>()));
}

#[test]
fn test_circular_providers_with_alternatives() {
    let router = PhaseRouterBuilder::new()
        .add_phase(relay::<Type2, Type1>())
        .and_then(|b| b.add_phase(relay::<Type3, Type2>()))
        .and_then(|b| b.add_phase(relay::<Type1, Type2>()))
        .and_then(|b| b.add_phase(source::<Type2>("type2")))
        .and_then(|b| b.add_phase(relay::<Type1, Type3>()))
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(router.resolve_chain::<Type1>().unwrap().ids(), vec![4, 1]);
    assert_eq!(router.consume::<Type1>().unwrap(), Type1("type2".into()));
}

// ============================================================================
// Outcome checking
// ============================================================================

#[test]
fn test_unmet_promise_ignored_without_checking() {
    let router = PhaseRouterBuilder::new()
        .add_phase(BrokenPromise)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(router.consume::<TestResult>().unwrap(), TestResult("success".into()));
}

#[test]
fn test_unmet_promise_reported_with_checking() {
    let router = PhaseRouterBuilder::new()
        .add_phase(BrokenPromise)
        .unwrap()
        .check_outcomes(true)
        .build()
        .unwrap();

    let err = router.consume::<TestResult>().unwrap_err();
    match &err {
        PhaseError::UnmetPromise { phase, missing } => {
            assert_eq!(phase, "broken-promise#1");
            assert_eq!(missing, &vec![OutcomeType::of::<OtherOutcome>()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("broken-promise#1"));
    assert!(!err.is_resolution_error());
}

#[test]
fn test_declared_outcome_never_written() {
    let router = PhaseRouterBuilder::new()
        .add_phase(FnPhase::new("silent", |_ctx| Ok(())).provides::<TestResult>())
        .unwrap()
        .build()
        .unwrap();

    let err = router.consume::<TestResult>().unwrap_err();
    assert!(matches!(err, PhaseError::OutcomeNotProduced(_)));
    assert_eq!(err.outcome_type(), Some(OutcomeType::of::<TestResult>()));
}

#[test]
fn test_unregistered_target_has_no_provider() {
    let router = PhaseRouterBuilder::new()
        .add_phase(relay::<Input1, OtherOutcome>())
        .and_then(|b| b.add_phase(source::<Input1>("x")))
        .and_then(|b| b.build())
        .unwrap();

    assert!(matches!(router.consume::<TestResult>(), Err(PhaseError::NoProvider(_))));
    assert_eq!(router.consume::<OtherOutcome>().unwrap(), OtherOutcome("x".into()));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_consumers_share_router() {
    let mut router = PhaseRouterBuilder::new()
        .add_phase(wrap::<Input1, Type3>())
        .and_then(|b| b.add_phase(wrap::<Type3, Type2>()))
        .and_then(|b| b.build())
        .unwrap();
    router.provide(Input1("t".into())).unwrap();
    let router = Arc::new(router);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            thread::spawn(move || router.consume::<Type2>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), Type2("[[t]]".into()));
    }
}
