//! Hand-written declarations every generated document starts with.
//!
//! The value wrappers here are what `ir::Wrapper` refers to, and each
//! `PREAMBLE_TAGS` entry in `lower` has its declaration here.

pub const HEADER: &str = "\
// @flow
// Generated code; do not edit. Regenerate with stylespec-typegen instead.
/* eslint-disable */
";

pub const PREAMBLE: &str = r#"export type ColorSpecification = string;

export type FormattedSpecification = string;

export type ResolvedImageSpecification = string;

export type PromoteIdSpecification = {[_: string]: string} | string;

export type FilterSpecification =
    | ['has', string]
    | ['!has', string]
    | ['==', string, string | number | boolean]
    | ['!=', string, string | number | boolean]
    | ['>', string, string | number | boolean]
    | ['>=', string, string | number | boolean]
    | ['<', string, string | number | boolean]
    | ['<=', string, string | number | boolean]
    | Array<string | FilterSpecification>; // in, !in, all, any and none have no tuple form

export type TransitionSpecification = {
    duration?: number,
    delay?: number
};

export type CameraFunctionSpecification<T> =
    | {| type: 'exponential', stops: Array<[number, T]> |}
    | {| type: 'interval',    stops: Array<[number, T]> |};

export type SourceFunctionSpecification<T> =
    | {| type: 'exponential', stops: Array<[number, T]>, property: string, default?: T |}
    | {| type: 'interval',    stops: Array<[number, T]>, property: string, default?: T |}
    | {| type: 'categorical', stops: Array<[string | number | boolean, T]>, property: string, default?: T |}
    | {| type: 'identity', property: string, default?: T |};

export type CompositeFunctionSpecification<T> =
    | {| type: 'exponential', stops: Array<[{zoom: number, value: number}, T]>, property: string, default?: T |}
    | {| type: 'interval',    stops: Array<[{zoom: number, value: number}, T]>, property: string, default?: T |}
    | {| type: 'categorical', stops: Array<[{zoom: number, value: string | number | boolean}, T]>, property: string, default?: T |};

export type ExpressionSpecification = Array<mixed>;

export type PropertyValueSpecification<T> =
    | T
    | CameraFunctionSpecification<T>
    | ExpressionSpecification;

export type DataDrivenPropertyValueSpecification<T> =
    | T
    | CameraFunctionSpecification<T>
    | SourceFunctionSpecification<T>
    | CompositeFunctionSpecification<T>
    | ExpressionSpecification;"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::PREAMBLE_TAGS;
    use crate::naming::specification_name;

    fn union_arms(name: &str) -> Vec<&'static str> {
        let start = PREAMBLE.find(&format!("export type {name}<T> =")).unwrap();
        let tail: &'static str = &PREAMBLE[start..];
        tail.lines()
            .skip(1)
            .take_while(|l| l.starts_with("    | "))
            .map(|l| l.trim_start_matches("    | ").trim_end_matches(';'))
            .collect()
    }

    #[test]
    fn every_preamble_tag_is_declared() {
        for tag in PREAMBLE_TAGS {
            let decl = format!("export type {} =", specification_name(tag));
            assert!(PREAMBLE.contains(&decl), "missing {decl}");
        }
    }

    #[test]
    fn data_driven_wrapper_is_a_strict_superset() {
        let zoom = union_arms("PropertyValueSpecification");
        let data = union_arms("DataDrivenPropertyValueSpecification");
        assert_eq!(zoom, ["T", "CameraFunctionSpecification<T>", "ExpressionSpecification"]);
        assert!(zoom.iter().all(|arm| data.contains(arm)));
        assert!(data.len() > zoom.len());
    }
}
