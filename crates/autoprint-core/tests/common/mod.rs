pub mod etag_server;
