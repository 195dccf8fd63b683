mod test_bad_tokens;
mod test_chat_exchange;
mod test_manual_handshake;
