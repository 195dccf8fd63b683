mod test_join_errors;
mod test_room_code_flow;
