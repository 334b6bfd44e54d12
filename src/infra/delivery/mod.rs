pub mod http_delivery_service;
