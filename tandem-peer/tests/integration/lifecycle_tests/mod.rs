mod test_media_attach;
mod test_start_new_session;
