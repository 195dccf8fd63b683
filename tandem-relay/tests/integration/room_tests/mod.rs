mod test_leave_frees_guest_slot;
mod test_room_expires;
mod test_run_binds_configured_address;
