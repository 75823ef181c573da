// klam-core - Tail call tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Deep guest tail recursion must run in bounded host stack, in both
//! driving modes. Deep non-tail recursion must not exhaust the test
//! thread's stack.

mod common;

use common::*;
use futures::executor::block_on;

fn num(n: f64) -> KlamVal {
    KlamVal::Number(n)
}

const COUNT: &str = "(defun count (N) (if (= N 100000) N (count (+ N 1))))";

#[test]
fn test_self_tail_recursion() {
    let rt = new_runtime();
    eval_all(COUNT, &rt).unwrap();
    assert_eq!(eval_all("(count 0)", &rt).unwrap(), num(100000.0));
}

#[test]
fn test_mutual_tail_recursion() {
    let rt = new_runtime();
    eval_all(
        "(defun my-even? (N) (if (= N 0) true (my-odd? (- N 1))))
         (defun my-odd? (N) (if (= N 0) false (my-even? (- N 1))))",
        &rt,
    )
    .unwrap();
    assert_eq!(
        eval_all("(my-even? 100000)", &rt).unwrap(),
        KlamVal::boolean(true)
    );
    assert_eq!(
        eval_all("(my-odd? 100001)", &rt).unwrap(),
        KlamVal::boolean(true)
    );
}

#[test]
fn test_tail_position_through_forms() {
    let rt = new_runtime();
    eval_all(
        "(defun walk (N Acc)
           (cond ((= N 0) Acc)
                 (true (let M (- N 1)
                         (do (set *last* M)
                             (walk M (+ Acc 1)))))))",
        &rt,
    )
    .unwrap();
    assert_eq!(eval_all("(walk 50000 0)", &rt).unwrap(), num(50000.0));
    assert_eq!(eval_all("(value *last*)", &rt).unwrap(), num(0.0));
}

#[test]
fn test_tail_calls_through_lambdas() {
    let rt = new_runtime();
    eval_all(
        "(defun hop (N) (if (= N 0) done ((lambda X (hop X)) (- N 1))))",
        &rt,
    )
    .unwrap();
    assert_eq!(
        eval_all("(hop 100000)", &rt).unwrap(),
        KlamVal::symbol("done")
    );
}

const SUM: &str = "(defun sum (N) (if (= N 0) 0 (+ N (sum (- N 1)))))";

#[test]
fn test_non_tail_recursion() {
    let rt = new_runtime();
    eval_all(SUM, &rt).unwrap();
    assert_eq!(eval_all("(sum 100)", &rt).unwrap(), num(5050.0));
}

#[test]
fn test_deep_non_tail_recursion() {
    let rt = new_runtime();
    eval_all(SUM, &rt).unwrap();
    assert_eq!(eval_all("(sum 10000)", &rt).unwrap(), num(50005000.0));
}

#[test]
fn test_deep_non_tail_list_walk() {
    let rt = new_runtime();
    eval_all(
        "(defun upto (N Acc) (if (= N 0) Acc (upto (- N 1) (cons N Acc))))
         (defun len (L) (if (cons? L) (+ 1 (len (tl L))) 0))
         (defun double-all (L) (if (cons? L) (cons (* 2 (hd L)) (double-all (tl L))) ()))",
        &rt,
    )
    .unwrap();
    assert_eq!(
        eval_all("(len (double-all (upto 20000 ())))", &rt).unwrap(),
        num(20000.0)
    );
    assert_eq!(
        eval_all("(hd (tl (double-all (upto 20000 ()))))", &rt).unwrap(),
        num(4.0)
    );
}

#[test]
fn test_deep_non_tail_recursion_async() {
    let rt = Runtime::new(Options::new().with_suspend(true));
    block_on(rt.eval_async(SUM)).unwrap();
    let result = block_on(rt.eval_async("(sum 10000)")).unwrap();
    assert_eq!(result, num(50005000.0));
}

#[test]
fn test_deep_recursion_error_unwinds() {
    let rt = new_runtime();
    eval_all(
        "(defun dive (N) (if (= N 0) (simple-error \"bottom\") (+ 1 (dive (- N 1)))))",
        &rt,
    )
    .unwrap();
    assert_eq!(
        eval_all("(trap-error (dive 10000) (lambda E (error-to-string E)))", &rt).unwrap(),
        KlamVal::string("bottom")
    );
}

#[test]
fn test_async_driver_gives_same_results() {
    let sync_rt = new_runtime();
    let async_rt = Runtime::new(Options::new().with_suspend(true));
    let program = format!("{} (count 99000)", COUNT);
    let expected = eval_all(&program, &sync_rt).unwrap();
    let actual = block_on(async_rt.eval_async(&program)).unwrap();
    assert_eq!(actual, expected);
    assert_eq!(actual, num(100000.0));
}
