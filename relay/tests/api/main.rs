mod basic;
mod blocking;
mod helper;
