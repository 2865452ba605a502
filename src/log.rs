// Writes a user-facing message line to a WriteHandle (or any io::Write),
// ignoring write failures. The caller must have std::io::Write in scope.
//
// Evaluates to (), so it can be used directly in map_err:
//   .map_err(|e| write_errln!(err_w, "{}", e))?;
#[macro_export]
macro_rules! write_errln {
    ($dst:expr, $($arg:tt)*) => {{
        let _ = writeln!($dst, $($arg)*);
    }};
}

#[macro_export]
macro_rules! write_err {
    ($dst:expr, $($arg:tt)*) => {{
        let _ = write!($dst, $($arg)*);
    }};
}
