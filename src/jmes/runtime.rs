use std::cell::RefCell;
use jmespath::Runtime;

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(super::new_runtime());
}

/// Run `f` with this thread's shared runtime. Building a runtime registers
/// every builtin, so transformations reuse one per thread.
pub fn with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> R {
    RUNTIME.with(|cell| f(&cell.borrow()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_has_custom_functions() {
        let out = with_runtime(|rt| {
            let expr = rt.compile("squish(@)").unwrap();
            let data = jmespath::Variable::String(" a  b ".into());
            expr.search(&data).unwrap().as_string().cloned()
        });
        assert_eq!(out.as_deref(), Some("a b"));
    }
}
