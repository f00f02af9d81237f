pub mod traccar;
