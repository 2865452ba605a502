use regex::Regex;
use std::{fmt::Debug, iter::zip};

pub fn assert_re(pattern: &str, haystack: &str) {
    let re = Regex::new(pattern).unwrap();
    assert!(re.is_match(haystack), "{:?} did not match {:?}", haystack, re);
}

fn eprint_vecs<T: PartialEq + Debug>(left: &[T], right: &[T]) {
    let mut err_str = "left != right. left: [\n".to_string();
    for o in left {
        err_str += &format!("{:?},\n", o);
    }
    err_str += "] != right: [\n";
    for o in right {
        err_str += &format!("{:?},\n", o);
    }
    eprintln!("{}]", err_str);
}

pub fn assert_vec_eq<T: PartialEq + Debug>(left: Vec<T>, right: Vec<T>) {
    assert_vecr_eq(&left, &right);
}

pub fn assert_vecr_eq<T: PartialEq + Debug>(left: &[T], right: &[T]) {
    if left == right {
        return;
    }
    eprint_vecs(left, right);

    if left.len() != right.len() {
        eprintln!("size of left ({}) != size of right ({})", left.len(), right.len());
        panic!();
    }
    for (i, (l, r)) in zip(left, right).enumerate() {
        if l != r {
            eprintln!("Mismatch at index {}:", i);
            eprintln!("left: {:#?} != right: {:#?}", l, r);
        }
    }
    panic!();
}

/// Compares two blocks of text line by line, ignoring CR line endings and
/// trailing blank lines.
pub fn assert_lines_eq(left: &str, right: &str) {
    let lines = |s: &str| -> Vec<String> {
        let mut v: Vec<String> =
            s.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
        while v.last().is_some_and(|l| l.is_empty()) {
            v.pop();
        }
        v
    };
    assert_vec_eq(lines(left), lines(right));
}
