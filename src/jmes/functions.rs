use jmespath::functions::{ArgumentType, CustomFunction, Signature};
use jmespath::{Context, Rcvar, Runtime, Variable};

fn string_arg(args: &[Rcvar], idx: usize) -> String {
    args.get(idx)
        .and_then(|v| v.as_string().cloned())
        .unwrap_or_default()
}

/// Register the JMESPath functions available to row transformations.
pub fn register_custom_functions(runtime: &mut Runtime) {
    // squish(string) -> string with whitespace runs collapsed
    runtime.register_function(
        "squish",
        Box::new(CustomFunction::new(
            Signature::new(vec![ArgumentType::String], None),
            Box::new(|args: &[Rcvar], _ctx: &mut Context| {
                let s = string_arg(args, 0);
                let out = s.split_whitespace().collect::<Vec<_>>().join(" ");
                Ok(Rcvar::new(Variable::String(out)))
            }),
        )),
    );

    // split(string, separator) -> array of strings
    runtime.register_function(
        "split",
        Box::new(CustomFunction::new(
            Signature::new(vec![ArgumentType::String, ArgumentType::String], None),
            Box::new(|args: &[Rcvar], _ctx: &mut Context| {
                let input = string_arg(args, 0);
                let sep = string_arg(args, 1);
                let parts: Vec<Rcvar> = if sep.is_empty() {
                    vec![Rcvar::new(Variable::String(input))]
                } else {
                    input
                        .split(sep.as_str())
                        .map(|p| Rcvar::new(Variable::String(p.to_string())))
                        .collect()
                };
                Ok(Rcvar::new(Variable::Array(parts)))
            }),
        )),
    );
}
