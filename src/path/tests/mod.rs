mod test_speed_sampling;
