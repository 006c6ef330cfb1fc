/// Blocking, dismissible messages shown to the user.
pub trait Notifier {
    fn info(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}
