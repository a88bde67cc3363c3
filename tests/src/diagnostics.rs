mod integration;
mod refresh;
