mod test_local_window_store;
