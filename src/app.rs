pub mod batch;
pub mod outfmt;

// Version is of the format 0.YY.MM[.i], or 0.year.month.optional_minor_increment,
// so it says when the tool was last updated rather than tracking crate
// compatibility.
pub const APP_VERSION: &str = "0.26.10";
