//! PWA scenarios against a fully wired worker

mod test_pwa_lifecycle;
