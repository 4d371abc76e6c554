//! Property-based tests for the compiler's correctness contract
//!
//! These tests use proptest to generate expressions, register maps,
//! environments and machine states and verify that:
//! 1. Evaluation and execution are deterministic
//! 2. Execution composes over program concatenation
//! 3. Compiled code computes the source value and leaves every register
//!    below the watermark untouched
//! 4. Compiled code never stores below the watermark
//! 5. The empty program is the identity

use accumc::compiler::contract::{agree_below, check_contract, consistent_state};
use accumc::compiler::debug::temporaries_written;
use accumc::compiler::Verifier;
use accumc::{
    compile, evaluate, parse_source, run, Environment, Expr, Instruction, MachineState, Reg,
    VariableMap, Word,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

/// Register pool variables are drawn from
const VAR_REGS: usize = 24;

/// Expressions over `NAMES` with arbitrary constants
fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        any::<Word>().prop_map(Expr::Const),
        (0..4u64).prop_map(Expr::Const),
        (0..NAMES.len()).prop_map(|i| Expr::var(NAMES[i])),
    ];
    leaf.prop_recursive(10, 256, 2, |inner| {
        (inner.clone(), inner).prop_map(|(lhs, rhs)| Expr::sum(lhs, rhs))
    })
}

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    let reg = (0usize..32).prop_map(Reg);
    prop_oneof![
        any::<Word>().prop_map(Instruction::LoadImmediate),
        reg.clone().prop_map(Instruction::Load),
        reg.clone().prop_map(Instruction::Store),
        reg.prop_map(Instruction::Add),
    ]
}

fn arb_program() -> impl Strategy<Value = Vec<Instruction>> {
    prop::collection::vec(arb_instruction(), 0..40)
}

fn arb_state() -> impl Strategy<Value = MachineState> {
    (
        any::<Word>(),
        prop::collection::vec((0usize..48, any::<Word>()), 0..12),
    )
        .prop_map(|(acc, regs)| {
            MachineState::with_registers(regs.into_iter().map(|(r, v)| (Reg(r), v)))
                .with_accumulator(acc)
        })
}

/// One instance of the contract's hypotheses
#[derive(Debug, Clone)]
struct Instance {
    map: VariableMap,
    expr: Expr,
    env: Environment,
    initial: MachineState,
    watermark: Reg,
}

/// Injective map, consistent initial state, watermark at or above the
/// tightest legal value, and junk everywhere the contract does not constrain
fn arb_instance() -> impl Strategy<Value = Instance> {
    (
        arb_expr(),
        Just((0..VAR_REGS).collect::<Vec<usize>>()).prop_shuffle(),
        prop::collection::vec(any::<Word>(), NAMES.len()),
        0usize..6,
        prop::collection::vec((0usize..VAR_REGS + 40, any::<Word>()), 0..20),
        any::<Word>(),
    )
        .prop_map(|(expr, regs, values, slack, junk, acc)| {
            let map: VariableMap = NAMES.iter().zip(&regs).map(|(n, r)| (*n, Reg(*r))).collect();
            let env: Environment = NAMES.iter().zip(&values).map(|(n, v)| (*n, *v)).collect();
            let tight = map.max_register_for(&expr).map_or(0, |r| r.index() + 1);
            let watermark = Reg(tight + slack);

            let mut initial = MachineState::with_registers(junk.into_iter().map(|(r, v)| (Reg(r), v)))
                .with_accumulator(acc);
            for name in expr.identifiers() {
                initial = initial.with_register(map[name], values[index_of(name)]);
            }

            Instance {
                map,
                expr,
                env,
                initial,
                watermark,
            }
        })
}

fn index_of(name: &str) -> usize {
    NAMES.iter().position(|n| *n == name).unwrap_or(0)
}

// =============================================================================
// MACHINE PROPERTIES
// =============================================================================

proptest! {
    /// run(p1 ++ p2, s) == run(p2, run(p1, s))
    #[test]
    fn run_composes_over_concatenation(
        p1 in arb_program(),
        p2 in arb_program(),
        state in arb_state()
    ) {
        let joined: Vec<Instruction> = p1.iter().chain(p2.iter()).copied().collect();
        prop_assert_eq!(
            run(&joined, state.clone()),
            run(&p2, run(&p1, state))
        );
    }

    /// run([], s) == s
    #[test]
    fn empty_program_is_identity(state in arb_state()) {
        prop_assert_eq!(run(&[], state.clone()), state);
    }

    /// Same program, same state, same result
    #[test]
    fn run_is_deterministic(program in arb_program(), state in arb_state()) {
        prop_assert_eq!(run(&program, state.clone()), run(&program, state));
    }

    /// Only Store changes registers, and only the one it names
    #[test]
    fn step_touches_at_most_one_register(instr in arb_instruction(), state in arb_state()) {
        let next = accumc::step(&instr, state.clone());
        for r in 0..64 {
            let reg = Reg(r);
            if instr.written_register() != Some(reg) {
                prop_assert_eq!(next.register(reg), state.register(reg));
            }
        }
    }
}

// =============================================================================
// EVALUATOR PROPERTIES
// =============================================================================

proptest! {
    /// Valid expressions evaluate deterministically
    #[test]
    fn evaluate_is_deterministic(instance in arb_instance()) {
        let first = evaluate(&instance.expr, &instance.env);
        let second = evaluate(&instance.expr, &instance.env);
        prop_assert_eq!(first, second);
    }

    /// Printing and re-parsing an expression yields the same tree
    #[test]
    fn display_reparses(expr in arb_expr()) {
        prop_assert_eq!(parse_source(&expr.to_string()).unwrap(), expr);
    }
}

// =============================================================================
// COMPILER CONTRACT
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// The accumulator ends with the source value and nothing below the
    /// watermark changes
    #[test]
    fn compiled_code_meets_contract(instance in arb_instance()) {
        let Instance { map, expr, env, initial, watermark } = instance;

        let program = compile(&map, &expr, watermark);
        let last = run(&program, initial.clone());

        prop_assert_eq!(last.accumulator, evaluate(&expr, &env).unwrap());
        prop_assert!(agree_below(&initial, &last, watermark));
    }

    /// The library's own contract checker agrees
    #[test]
    fn contract_checker_reports_success(instance in arb_instance()) {
        let report = check_contract(
            &instance.map,
            &instance.expr,
            &instance.env,
            &instance.initial,
            instance.watermark,
        ).unwrap();
        prop_assert!(report.holds(), "{:?}", report);
    }

    /// No Store in compiled code targets a register below the watermark
    #[test]
    fn compiled_code_never_stores_below_watermark(instance in arb_instance()) {
        let program = compile(&instance.map, &instance.expr, instance.watermark);
        for instr in &program {
            if let Instruction::Store(reg) = instr {
                prop_assert!(*reg >= instance.watermark);
            }
        }
        let verdict = Verifier::new(instance.watermark).verify(&program);
        prop_assert!(verdict.valid, "{:?}", verdict.errors);
    }

    /// Temporaries form a contiguous block starting at the watermark whose
    /// size is the expression's register demand, never more than its depth
    #[test]
    fn temporaries_are_bump_allocated(instance in arb_instance()) {
        let t = instance.watermark;
        let program = compile(&instance.map, &instance.expr, t);

        let mut temps = temporaries_written(&program, t);
        temps.sort();
        let expected: Vec<Reg> = (0..instance.expr.temporaries()).map(|i| Reg(t.index() + i)).collect();
        prop_assert_eq!(temps, expected);
        prop_assert!(instance.expr.temporaries() <= instance.expr.depth());
    }

    /// Compiling at a higher watermark shifts temporaries but not the result
    #[test]
    fn result_independent_of_watermark(instance in arb_instance(), extra in 1usize..16) {
        let low = run(
            &compile(&instance.map, &instance.expr, instance.watermark),
            instance.initial.clone(),
        );
        let high_t = Reg(instance.watermark.index() + extra);
        let high = run(&compile(&instance.map, &instance.expr, high_t), instance.initial);
        prop_assert_eq!(low.accumulator, high.accumulator);
    }

    /// Symbol resolution always produces a map the contract accepts
    #[test]
    fn resolved_map_meets_contract(expr in arb_expr(), values in prop::collection::vec(any::<Word>(), NAMES.len())) {
        let map = VariableMap::resolve(&expr);
        let env: Environment = NAMES.iter().zip(&values).map(|(n, v)| (*n, *v)).collect();
        let initial = consistent_state(&map, &env, &expr).unwrap();

        let report = check_contract(&map, &expr, &env, &initial, map.watermark().unwrap()).unwrap();
        prop_assert!(report.holds());
    }
}

// =============================================================================
// REGISTER ALIASING
// =============================================================================
//
// The map is not required to be injective. When two identifiers share a
// register, precondition (a) forces them to have the same value, and under
// that condition the contract is observed to hold. When their values differ
// no initial state satisfies (a) and the checker refuses the instance.

/// Map drawing from only three registers, so most identifiers alias;
/// the environment is derived from per-register values to stay consistent
fn arb_aliased_instance() -> impl Strategy<Value = Instance> {
    (
        arb_expr(),
        prop::collection::vec(0usize..3, NAMES.len()),
        prop::collection::vec(any::<Word>(), 3),
        0usize..4,
    )
        .prop_map(|(expr, regs, reg_values, slack)| {
            let map: VariableMap = NAMES.iter().zip(&regs).map(|(n, r)| (*n, Reg(*r))).collect();
            let env: Environment = NAMES
                .iter()
                .zip(&regs)
                .map(|(n, r)| (*n, reg_values[*r]))
                .collect();
            let initial = MachineState::with_registers(
                reg_values.iter().enumerate().map(|(r, v)| (Reg(r), *v)),
            );
            Instance {
                map,
                expr,
                env,
                initial,
                watermark: Reg(3 + slack),
            }
        })
}

proptest! {
    /// Aliased maps with a consistent state still satisfy the contract
    #[test]
    fn aliased_map_meets_contract(instance in arb_aliased_instance()) {
        let report = check_contract(
            &instance.map,
            &instance.expr,
            &instance.env,
            &instance.initial,
            instance.watermark,
        ).unwrap();
        prop_assert!(report.holds(), "{:?}", report);
    }

    /// Aliased identifiers with different values cannot be given a
    /// consistent initial state
    #[test]
    fn aliased_map_with_conflicting_values_is_rejected(a in any::<Word>(), b in any::<Word>()) {
        prop_assume!(a != b);
        let map: VariableMap = [("x", Reg(0)), ("y", Reg(0))].into_iter().collect();
        let env: Environment = [("x", a), ("y", b)].into_iter().collect();
        let expr = Expr::sum(Expr::var("x"), Expr::var("y"));
        let initial = MachineState::with_registers([(Reg(0), a)]);

        let result = check_contract(&map, &expr, &env, &initial, Reg(1));
        let is_inconsistent = matches!(result, Err(accumc::Error::InconsistentState { .. }));
        prop_assert!(is_inconsistent);
    }
}
