// Core domain logic of the tool.
//
// `collector` walks the submission directory and applies the layered
// `.zipignore` rules; `statement` generates and parses the localized
// statement of authorship; `archive` names, builds and verifies the ZIP
// archive; `locale` holds the immutable message table the other modules
// read their templates and UI strings from.
pub mod archive;
pub mod collector;
pub mod locale;
pub mod statement;
