pub mod track_server;
