mod blocking;
mod commands;
mod pub_sub;
mod replication;
mod test_utils;
mod transactions;
