// Console collaborators of the packaging flow.
//
// `form` runs the interactive statement form (confirmation and the
// name/Neptun inputs); `reporter` prints the numbered step banners and
// sub-task progress lines.
pub mod form;
pub mod reporter;
