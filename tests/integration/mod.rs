mod menu_session;
