pub mod pdftotext;
