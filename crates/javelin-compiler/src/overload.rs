//! Overload resolution for method and constructor invocations.
//!
//! ## Algorithm
//!
//! 1. Keep candidates whose arity matches the call
//! 2. Phase one: candidates applicable by strict invocation conversion
//! 3. Phase two (only if phase one found nothing): loose invocation,
//!    which adds boxing and unboxing
//! 4. Among the applicable candidates pick the one more specific than
//!    all others; a method is more specific than another when each of its
//!    parameter types converts to the other's by strict invocation
//! 5. No such candidate means the invocation is ambiguous

use javelin_core::{CompilationError, JavaType, Span};

use crate::context::{ClassTable, MethodMatch};
use crate::conversion::{Conversion, loose_invocation, strict_invocation};

/// Result of successful overload resolution.
#[derive(Debug, Clone)]
pub struct OverloadMatch {
    pub method: MethodMatch,
    /// Conversion applied to each argument.
    pub conversions: Vec<Conversion>,
    /// Sum of the conversion ranks (lower is closer).
    pub cost: u32,
}

type Applicability = fn(&ClassTable<'_>, &JavaType, &JavaType) -> Option<Conversion>;

/// Select the invoked method among `candidates` for arguments of types
/// `args`. `display` names the method in diagnostics.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_overload(
    table: &ClassTable<'_>,
    display: &str,
    candidates: &[MethodMatch],
    args: &[JavaType],
    span: Span,
) -> Result<OverloadMatch, CompilationError> {
    let phases: [Applicability; 2] = [strict_invocation, loose_invocation];
    for applicable in phases {
        let matches: Vec<OverloadMatch> = candidates
            .iter()
            .filter(|c| c.method.params().len() == args.len())
            .filter_map(|c| applicable_match(table, c, args, applicable))
            .collect();
        if matches.is_empty() {
            continue;
        }
        log::trace!(
            "{} applicable overload(s) of {display} for ({})",
            matches.len(),
            format_args(args)
        );
        return most_specific(table, display, matches, span);
    }

    Err(CompilationError::NoApplicableMethod {
        name: display.to_string(),
        args: format_args(args),
        span,
    })
}

fn applicable_match(
    table: &ClassTable<'_>,
    candidate: &MethodMatch,
    args: &[JavaType],
    applicable: Applicability,
) -> Option<OverloadMatch> {
    let mut conversions = Vec::with_capacity(args.len());
    let mut cost = 0;
    for (arg, param) in args.iter().zip(candidate.method.params()) {
        let conversion = applicable(table, arg, param)?;
        cost += conversion.rank() as u32;
        conversions.push(conversion);
    }
    Some(OverloadMatch {
        method: candidate.clone(),
        conversions,
        cost,
    })
}

/// Whether every parameter of `a` converts to the matching parameter of
/// `b` by strict invocation.
fn more_specific(table: &ClassTable<'_>, a: &MethodMatch, b: &MethodMatch) -> bool {
    a.method
        .params()
        .iter()
        .zip(b.method.params())
        .all(|(x, y)| strict_invocation(table, x, y).is_some())
}

fn most_specific(
    table: &ClassTable<'_>,
    display: &str,
    mut matches: Vec<OverloadMatch>,
    span: Span,
) -> Result<OverloadMatch, CompilationError> {
    if matches.len() == 1 {
        return Ok(matches.remove(0));
    }
    let winner = (0..matches.len()).find(|&i| {
        (0..matches.len())
            .all(|j| i == j || more_specific(table, &matches[i].method, &matches[j].method))
    });
    match winner {
        Some(index) => Ok(matches.swap_remove(index)),
        None => {
            let candidates = matches
                .iter()
                .map(|m| format!("{}.{}{}", m.method.owner, m.method.method.name, m.method.method.descriptor))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CompilationError::AmbiguousInvocation {
                name: display.to_string(),
                candidates,
                span,
            })
        }
    }
}

fn format_args(args: &[JavaType]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::{AccessFlags, ClassPath, ClassShapeBuilder, PrimitiveType};

    fn resolve(
        table: &ClassTable<'_>,
        class: &str,
        name: &str,
        args: &[JavaType],
    ) -> Result<OverloadMatch, CompilationError> {
        let candidates = table.find_methods(class, name);
        resolve_overload(table, name, &candidates, args, Span::default())
    }

    #[test]
    fn exact_match_wins() {
        let class_path = ClassPath::with_builtins();
        let table = ClassTable::new(&class_path);
        let chosen = resolve(&table, "java.io.PrintStream", "println", &[JavaType::CHAR]).unwrap();
        assert_eq!(chosen.method.method.descriptor.to_string(), "(C)V");
        assert_eq!(chosen.cost, 0);
    }

    #[test]
    fn widening_prefers_the_nearest_type() {
        let class_path = ClassPath::with_builtins();
        let table = ClassTable::new(&class_path);
        let byte = JavaType::Primitive(PrimitiveType::Byte);
        let chosen = resolve(&table, "java.io.PrintStream", "println", &[byte]).unwrap();
        assert_eq!(chosen.method.method.descriptor.to_string(), "(I)V");
        assert_eq!(
            chosen.conversions,
            vec![Conversion::WideningPrimitive(PrimitiveType::Int)]
        );

        let mixed = resolve(&table, "java.lang.Math", "max", &[JavaType::INT, JavaType::LONG]).unwrap();
        assert_eq!(mixed.method.method.descriptor.to_string(), "(JJ)J");
    }

    #[test]
    fn boxing_only_in_second_phase() {
        let class_path = ClassPath::with_builtins();
        let table = ClassTable::new(&class_path);
        let integer = JavaType::class("java.lang.Integer");
        let chosen = resolve(&table, "java.io.PrintStream", "println", &[integer]).unwrap();
        assert_eq!(
            chosen.method.method.descriptor.to_string(),
            "(Ljava/lang/Object;)V"
        );
        assert_eq!(chosen.conversions, vec![Conversion::WideningReference]);
    }

    #[test]
    fn null_selects_the_most_specific_reference() {
        let class_path = ClassPath::with_builtins();
        let table = ClassTable::new(&class_path);
        let chosen = resolve(&table, "java.io.PrintStream", "println", &[JavaType::Null]);
        // String and char[] are unrelated, so neither is more specific.
        assert!(matches!(
            chosen,
            Err(CompilationError::AmbiguousInvocation { .. })
        ));
    }

    #[test]
    fn ambiguous_and_missing() {
        let mut class_path = ClassPath::with_builtins();
        class_path.insert(
            ClassShapeBuilder::class("demo.Pair")
                .method("f", "(IJ)V", AccessFlags::PUBLIC | AccessFlags::STATIC)
                .method("f", "(JI)V", AccessFlags::PUBLIC | AccessFlags::STATIC)
                .build()
                .unwrap(),
        );
        let table = ClassTable::new(&class_path);
        let err = resolve(&table, "demo.Pair", "f", &[JavaType::INT, JavaType::INT]).unwrap_err();
        assert!(matches!(err, CompilationError::AmbiguousInvocation { .. }));

        let err = resolve(&table, "demo.Pair", "f", &[JavaType::string()]).unwrap_err();
        assert!(matches!(err, CompilationError::NoApplicableMethod { ref args, .. } if args == "java.lang.String"));
    }
}
