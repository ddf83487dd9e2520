//! Side effects the client delegates to the hosting page.

/// Navigation and network access of the page being patched.
pub trait PageHost {
    /// Reload the whole page.
    fn reload(&mut self);

    /// Re-fetch a resource, bypassing any cached copy.
    fn fetch(&mut self, url: &str);
}

impl<H: PageHost + ?Sized> PageHost for &mut H {
    fn reload(&mut self) {
        (**self).reload();
    }

    fn fetch(&mut self, url: &str) {
        (**self).fetch(url);
    }
}
